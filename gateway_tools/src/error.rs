use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid gateway response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Gateway request failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The gateway reported a failure: {0}")]
    Rejected(String),
}
