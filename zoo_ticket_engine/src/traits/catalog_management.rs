use thiserror::Error;

use crate::db_types::TicketGroup;

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the ticket group with all of its variants.
    async fn fetch_ticket_group(&self, id: i64) -> Result<Option<TicketGroup>, CatalogError>;
}
