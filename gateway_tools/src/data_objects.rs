use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::GatewayApiError;

/// A bank entry as returned by the gateway. The gateway owns the shape of these records, so they are passed through
/// to the frontend untouched.
pub type Bank = Value;

/// The gateway is inconsistent about how it reports success (`true`, `1`, `"1"`, `"true"`...).
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "success" | "ok"),
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub success: Value,
    #[serde(default)]
    pub response_msg: Option<TokenMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMessage {
    pub rand_key: Option<String>,
}

impl TokenResponse {
    pub fn is_success(&self) -> bool {
        is_truthy(&self.success)
    }

    pub fn into_rand_key(self) -> Result<String, GatewayApiError> {
        if !self.is_success() {
            return Err(GatewayApiError::Rejected(format!("token request was unsuccessful ({})", self.success)));
        }
        self.response_msg
            .and_then(|m| m.rand_key)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GatewayApiError::ResponseError("token response did not contain a rand_key".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankListResponse {
    #[serde(default)]
    pub success: Value,
    #[serde(default)]
    pub data: Value,
}

impl BankListResponse {
    pub fn is_success(&self) -> bool {
        is_truthy(&self.success)
    }

    /// `data` is a JSON document encoded as a string. Decode it and return the bank array.
    pub fn into_banks(self) -> Result<Vec<Bank>, GatewayApiError> {
        if !self.is_success() {
            return Err(GatewayApiError::Rejected(format!("bank list request was unsuccessful ({})", self.success)));
        }
        let decoded = match self.data {
            Value::String(s) => serde_json::from_str::<Value>(&s).map_err(|e| GatewayApiError::JsonError(e.to_string()))?,
            other => other,
        };
        match decoded {
            Value::Array(banks) => Ok(banks),
            other => Err(GatewayApiError::ResponseError(format!("expected a bank array, got {other}"))),
        }
    }
}
