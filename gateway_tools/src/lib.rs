//! # Payment gateway tools
//!
//! A small, typed client for the government payment gateway used for ticket checkout.
//!
//! * [`PaymentGatewayApi`] performs the two server-to-server calls: the redirect-token bootstrap and the bank list.
//! * [`RedirectForm`] builds the signed `getRedirectUrl` form and renders it as an auto-submitting HTML page that sends
//!   the customer's browser to the gateway.
//! * [`calculate_checksum`] produces the SHA-512 `jp_checksum` value.
mod api;
pub mod config;
mod data_objects;
mod error;
mod redirect_form;

pub mod helpers;

pub use api::PaymentGatewayApi;
pub use config::GatewayConfig;
pub use data_objects::{Bank, BankListResponse, TokenResponse};
pub use error::GatewayApiError;
pub use helpers::calculate_checksum;
pub use redirect_form::{CheckoutDetails, RedirectForm, GATEWAY_CODE_DEFAULT, GATEWAY_CODE_DIRECT_BANK};
