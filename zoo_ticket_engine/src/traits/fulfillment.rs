use thiserror::Error;

use crate::{db_types::OrderNo, traits::FulfillmentResult};

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("Could not reach the ticketing system: {0}")]
    Network(String),
    #[error("The ticketing system rejected the order. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid response from the ticketing system: {0}")]
    InvalidResponse(String),
    #[error("Fulfillment is not configured: {0}")]
    NotConfigured(String),
}

/// Registers a paid order with the downstream ticketing system and returns the issued tickets.
///
/// The order flow calls this at most once per order, immediately after the order moves into `success`.
#[allow(async_fn_in_trait)]
pub trait FulfillmentProvider {
    async fn fulfil_order(&self, order_no: &OrderNo) -> Result<FulfillmentResult, FulfillmentError>;
}
