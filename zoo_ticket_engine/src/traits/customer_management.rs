use thiserror::Error;

use crate::db_types::{Customer, NewCustomer};

#[derive(Debug, Clone, Error)]
pub enum CustomerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A customer record requires an email address")]
    MissingEmail,
}

impl From<sqlx::Error> for CustomerError {
    fn from(e: sqlx::Error) -> Self {
        CustomerError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait CustomerManagement {
    async fn fetch_customer(&self, cust_id: i64) -> Result<Option<Customer>, CustomerError>;

    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerError>;

    /// Returns the customer registered under the email address, registering a new one with a blank password if there
    /// is none. Safe to call concurrently for the same address.
    async fn fetch_or_create_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerError>;
}
