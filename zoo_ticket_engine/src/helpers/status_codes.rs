use crate::db_types::OrderStatus;

pub const DEFAULT_SUCCESS_CODES: [&str; 1] = ["00"];
pub const DEFAULT_PENDING_CODES: [&str; 3] = ["AP", "09", "99"];

/// Maps the gateway's `status_transaksi` codes onto order statuses. Any code that is neither a success nor a pending
/// code is a failure.
#[derive(Debug, Clone)]
pub struct StatusCodeMap {
    success: Vec<String>,
    pending: Vec<String>,
}

impl Default for StatusCodeMap {
    fn default() -> Self {
        Self {
            success: DEFAULT_SUCCESS_CODES.iter().map(|s| s.to_string()).collect(),
            pending: DEFAULT_PENDING_CODES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StatusCodeMap {
    /// Empty lists fall back to the default codes.
    pub fn new(success: Vec<String>, pending: Vec<String>) -> Self {
        let defaults = Self::default();
        let success = if success.is_empty() { defaults.success } else { success };
        let pending = if pending.is_empty() { defaults.pending } else { pending };
        Self { success, pending }
    }

    pub fn status_for(&self, code: &str) -> OrderStatus {
        let code = code.trim();
        if self.success.iter().any(|c| c.eq_ignore_ascii_case(code)) {
            OrderStatus::Success
        } else if self.pending.iter().any(|c| c.eq_ignore_ascii_case(code)) {
            OrderStatus::Pending
        } else {
            OrderStatus::Failed
        }
    }

    pub fn success_codes(&self) -> &[String] {
        &self.success
    }

    pub fn pending_codes(&self) -> &[String] {
        &self.pending
    }
}
