use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;

use crate::{
    config::GatewayConfig,
    data_objects::{Bank, BankListResponse, TokenResponse},
    GatewayApiError,
};

pub const METHOD_GET_REDIRECT_URL: &str = "getRedirectUrl";
pub const METHOD_GET_BANK_LIST: &str = "getBankList";

#[derive(Clone)]
pub struct PaymentGatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl PaymentGatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let val = HeaderValue::from_str(config.api_key.reveal().as_str())
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        headers.insert("jp-api-key", val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Posts a url-encoded form to the gateway API endpoint and decodes the JSON reply.
    pub async fn form_query<T: DeserializeOwned>(&self, form: &[(&str, &str)]) -> Result<T, GatewayApiError> {
        let url = self.config.api_url.as_str();
        trace!("💳️ Sending gateway request to {url}");
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| GatewayApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ Gateway request successful. {}", response.status());
            let body = response.text().await.map_err(|e| GatewayApiError::ResponseError(e.to_string()))?;
            serde_json::from_str::<T>(&body).map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::ResponseError(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    /// Fetches the one-time `rand_key` that goes into the redirect form as `jp_token`.
    pub async fn fetch_redirect_token(&self) -> Result<String, GatewayApiError> {
        debug!("💳️ Requesting redirect token");
        let form = [
            ("jp_ag_token", self.config.ag_token.as_str()),
            ("method", METHOD_GET_REDIRECT_URL),
            ("jp_gateway", "2"),
        ];
        let response = self.form_query::<TokenResponse>(&form).await?;
        let key = response.into_rand_key()?;
        debug!("💳️ Redirect token received");
        Ok(key)
    }

    pub async fn fetch_bank_list(&self, mode: &str) -> Result<Vec<Bank>, GatewayApiError> {
        debug!("💳️ Requesting bank list for mode '{mode}'");
        let form = [("jp_ag_token", self.config.ag_token.as_str()), ("method", METHOD_GET_BANK_LIST), ("mode", mode)];
        let response = self.form_query::<BankListResponse>(&form).await?;
        let banks = response.into_banks()?;
        info!("💳️ Fetched {} banks for mode '{mode}'", banks.len());
        Ok(banks)
    }
}
