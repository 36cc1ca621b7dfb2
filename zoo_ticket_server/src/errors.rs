use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use gateway_tools::GatewayApiError;
use log::error;
use thiserror::Error;
use zoo_ticket_engine::{traits::OrderStoreError, OrderFlowError};

use crate::data_objects::ApiResponse;

/// Response codes carried in the `respCode` field of every JSON response.
pub mod codes {
    pub const SUCCESS: u32 = 2000;
    pub const MALFORMED_REQUEST: u32 = 4000;
    pub const MISSING_FIELD: u32 = 4001;
    pub const INVALID_VALUE: u32 = 4002;
    pub const MISSING_TOKEN: u32 = 4003;
    pub const INVALID_CALLBACK: u32 = 4005;
    pub const INVALID_TOKEN: u32 = 4007;
    pub const FORBIDDEN: u32 = 4011;
    pub const INTERNAL_ERROR: u32 = 5000;
    pub const GATEWAY_ERROR: u32 = 5002;
    pub const NOT_FOUND: u32 = 5003;
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Malformed request. {0}")]
    MalformedRequest(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid value. {0}")]
    InvalidValue(String),
    #[error("Invalid payment response")]
    InvalidCallback,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The payment gateway could not complete the request. {0}")]
    GatewayError(String),
}

impl ServerError {
    pub fn resp_code(&self) -> u32 {
        match self {
            Self::MalformedRequest(_) => codes::MALFORMED_REQUEST,
            Self::MissingField(_) => codes::MISSING_FIELD,
            Self::InvalidValue(_) => codes::INVALID_VALUE,
            Self::InvalidCallback => codes::INVALID_CALLBACK,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => codes::MISSING_TOKEN,
                AuthError::InvalidToken(_) => codes::INVALID_TOKEN,
                AuthError::InsufficientPermissions(_) => codes::FORBIDDEN,
                AuthError::TokenCreation(_) => codes::INTERNAL_ERROR,
            },
            Self::NoRecordFound(_) => codes::NOT_FOUND,
            Self::GatewayError(_) => codes::GATEWAY_ERROR,
            Self::InitializeError(_) |
            Self::BackendError(_) |
            Self::IOError(_) |
            Self::ConfigurationError(_) |
            Self::Unspecified(_) => codes::INTERNAL_ERROR,
        }
    }

    /// The `respDesc` text. Internal failures are reported generically and logged instead.
    fn description(&self) -> String {
        match self.resp_code() {
            codes::INTERNAL_ERROR => {
                error!("💻️ Internal error while handling a request. {self}");
                "Internal server error".to_string()
            },
            _ => self.to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::InvalidValue(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCallback => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::TokenCreation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::GatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ApiResponse::<()>::failure(self.resp_code(), self.description());
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::to_string(&body).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No bearer token was provided.")]
    MissingToken,
    #[error("The bearer token is invalid. {0}")]
    InvalidToken(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Could not issue a token. {0}")]
    TokenCreation(String),
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::MissingField(f) => Self::MissingField(f),
            OrderFlowError::InvalidValue(s) => Self::InvalidValue(s),
            OrderFlowError::InvalidEnvelope(_) => Self::InvalidCallback,
            OrderFlowError::OrderNotFound(s) => Self::NoRecordFound(format!("Order {s} does not exist")),
            OrderFlowError::CustomerLookupFailed(_) |
            OrderFlowError::OrderPersistenceFailed(_) |
            OrderFlowError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<OrderStoreError> for ServerError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::OrderNotFound(_) | OrderStoreError::OrderIdNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            e => Self::BackendError(e.to_string()),
        }
    }
}

impl From<GatewayApiError> for ServerError {
    fn from(e: GatewayApiError) -> Self {
        Self::GatewayError(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use zoo_ticket_engine::helpers::EnvelopeError;

    use super::*;

    #[test]
    fn status_and_codes() {
        let cases = [
            (ServerError::MissingField("email".into()), StatusCode::BAD_REQUEST, 4001),
            (ServerError::InvalidValue("quantity".into()), StatusCode::BAD_REQUEST, 4002),
            (ServerError::AuthenticationError(AuthError::MissingToken), StatusCode::UNAUTHORIZED, 4003),
            (ServerError::AuthenticationError(AuthError::InvalidToken("exp".into())), StatusCode::UNAUTHORIZED, 4007),
            (ServerError::AuthenticationError(AuthError::InsufficientPermissions("".into())), StatusCode::FORBIDDEN, 4011),
            (ServerError::InvalidCallback, StatusCode::BAD_REQUEST, 4005),
            (ServerError::NoRecordFound("x".into()), StatusCode::NOT_FOUND, 5003),
            (ServerError::GatewayError("x".into()), StatusCode::BAD_GATEWAY, 5002),
            (ServerError::BackendError("x".into()), StatusCode::INTERNAL_SERVER_ERROR, 5000),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status, "{err}");
            assert_eq!(err.resp_code(), code, "{err}");
        }
    }

    #[test]
    fn envelope_errors_are_opaque() {
        let err = ServerError::from(OrderFlowError::InvalidEnvelope(EnvelopeError::InvalidPadding));
        assert!(matches!(err, ServerError::InvalidCallback));
        assert_eq!(err.description(), "Invalid payment response");
    }

    #[test]
    fn internal_errors_are_generic() {
        let err = ServerError::from(OrderFlowError::DatabaseError("disk I/O error at /var/db".into()));
        assert_eq!(err.description(), "Internal server error");
    }
}
