use crate::traits::{CatalogManagement, CustomerManagement, OrderManagement, OrderStoreError};

/// The highest level of behaviour a database backend provides for the order flow.
#[allow(async_fn_in_trait)]
pub trait TicketOrderDatabase: Clone + OrderManagement + CustomerManagement + CatalogManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    async fn close(&mut self) -> Result<(), OrderStoreError>;
}
