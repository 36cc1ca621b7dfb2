//! HTTP adapter for the external ticketing system.
//!
//! A paid order is registered with `POST <TICKETING_API_URL>/orders/fulfil` and the reply lists the issued tickets.
use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Serialize;
use zoo_ticket_engine::{
    db_types::OrderNo,
    traits::{FulfillmentError, FulfillmentProvider, FulfillmentResult},
};

use crate::config::TicketingConfig;

pub const FULFIL_PATH: &str = "/orders/fulfil";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FulfilRequest<'a> {
    order_no: &'a str,
}

#[derive(Clone)]
pub struct TicketingApi {
    config: TicketingConfig,
    client: Arc<Client>,
}

impl TicketingApi {
    pub fn new(config: TicketingConfig) -> Result<Self, FulfillmentError> {
        let mut headers = HeaderMap::with_capacity(1);
        let val = HeaderValue::from_str(config.api_key.reveal().as_str())
            .map_err(|e| FulfillmentError::NotConfigured(format!("invalid TICKETING_API_KEY. {e}")))?;
        headers.insert("x-api-key", val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FulfillmentError::NotConfigured(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    fn url(&self) -> Result<String, FulfillmentError> {
        let base = self.config.api_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(FulfillmentError::NotConfigured("TICKETING_API_URL is not set".into()));
        }
        Ok(format!("{base}{FULFIL_PATH}"))
    }
}

impl FulfillmentProvider for TicketingApi {
    async fn fulfil_order(&self, order_no: &OrderNo) -> Result<FulfillmentResult, FulfillmentError> {
        let url = self.url()?;
        debug!("🎟️ Requesting tickets for order [{order_no}] from {url}");
        let response = self
            .client
            .post(url)
            .json(&FulfilRequest { order_no: order_no.as_str() })
            .send()
            .await
            .map_err(|e| FulfillmentError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("🎟️ Ticketing system rejected order [{order_no}] with {status}. {message}");
            return Err(FulfillmentError::Rejected { status: status.as_u16(), message });
        }
        let body = response.text().await.map_err(|e| FulfillmentError::Network(e.to_string()))?;
        let result = serde_json::from_str::<FulfillmentResult>(&body)
            .map_err(|e| FulfillmentError::InvalidResponse(e.to_string()))?;
        info!("🎟️ Ticketing system issued {} tickets for order [{order_no}]", result.tickets.len());
        Ok(result)
    }
}
