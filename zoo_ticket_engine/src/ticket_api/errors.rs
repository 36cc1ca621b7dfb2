use thiserror::Error;

use crate::{
    helpers::EnvelopeError,
    traits::{CatalogError, CustomerError, OrderStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid value. {0}")]
    InvalidValue(String),
    #[error("Could not resolve the customer. {0}")]
    CustomerLookupFailed(String),
    #[error("Could not save the order. {0}")]
    OrderPersistenceFailed(String),
    #[error("The payment callback could not be decoded. {0}")]
    InvalidEnvelope(#[from] EnvelopeError),
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl OrderFlowError {
    /// True for errors caused by the request content rather than by the system.
    pub fn is_validation(&self) -> bool {
        matches!(self, OrderFlowError::MissingField(_) | OrderFlowError::InvalidValue(_))
    }
}

impl From<OrderStoreError> for OrderFlowError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::OrderNotFound(no) => OrderFlowError::OrderNotFound(no.to_string()),
            OrderStoreError::OrderIdNotFound(id) => OrderFlowError::OrderNotFound(id.to_string()),
            e @ OrderStoreError::AmountOutOfRange => OrderFlowError::InvalidValue(e.to_string()),
            e => OrderFlowError::DatabaseError(e.to_string()),
        }
    }
}

impl From<CustomerError> for OrderFlowError {
    fn from(e: CustomerError) -> Self {
        OrderFlowError::CustomerLookupFailed(e.to_string())
    }
}

impl From<CatalogError> for OrderFlowError {
    fn from(e: CatalogError) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}
