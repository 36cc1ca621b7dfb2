use std::time::Duration;

use log::*;
use ztg_common::Secret;

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// The action URL of the gateway's redirect form. The customer's browser is posted here.
    pub gateway_url: String,
    /// The server-to-server endpoint used for the token bootstrap and the bank list.
    pub api_url: String,
    /// Shared secret. Sent in the `jp-api-key` header, and its first 32 bytes are the AES-256 key of the return payload.
    pub api_key: Secret<String>,
    /// Merchant identifier (`jp_ag_token`).
    pub ag_token: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_url: String::default(),
            api_url: String::default(),
            api_key: Secret::default(),
            ag_token: String::default(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let gateway_url = std::env::var("GATEWAY_URL").unwrap_or_else(|_| {
            warn!("💳️ GATEWAY_URL not set. Checkout forms will not reach the payment gateway.");
            String::default()
        });
        let api_url = std::env::var("GATEWAY_API_URL").unwrap_or_else(|_| {
            info!("💳️ GATEWAY_API_URL not set, using GATEWAY_URL for token and bank list requests");
            gateway_url.clone()
        });
        let api_key = Secret::new(std::env::var("GATEWAY_API_KEY").unwrap_or_else(|_| {
            warn!("💳️ GATEWAY_API_KEY not set. Payment callbacks cannot be decrypted.");
            String::default()
        }));
        let ag_token = std::env::var("AG_TOKEN").unwrap_or_else(|_| {
            warn!("💳️ AG_TOKEN not set. The gateway will reject checkout requests.");
            String::default()
        });
        Self { gateway_url, api_url, api_key, ag_token, timeout: DEFAULT_GATEWAY_TIMEOUT }
    }
}
