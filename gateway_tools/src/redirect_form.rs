use ztg_common::Cents;

use crate::{
    api::METHOD_GET_REDIRECT_URL,
    config::GatewayConfig,
    helpers::{calculate_checksum, escape_html},
};

/// Gateway code for a direct bank transfer, used when the customer already picked a bank.
pub const GATEWAY_CODE_DIRECT_BANK: &str = "2";
/// Gateway code that lets the customer choose the payment channel on the gateway's own page.
pub const GATEWAY_CODE_DEFAULT: &str = "1963";

/// The order-specific part of a checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutDetails {
    pub buyer_name: String,
    pub email: String,
    pub order_no: String,
    pub total_amount: Cents,
    pub product_id: String,
    pub product_desc: String,
    pub bank_code: Option<String>,
    pub msg_token: Option<String>,
}

/// A signed `getRedirectUrl` form. Submitting it from the customer's browser starts the payment on the gateway.
#[derive(Debug, Clone)]
pub struct RedirectForm {
    action: String,
    fields: Vec<(&'static str, String)>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RedirectForm {
    /// `token` is the `rand_key` from the token bootstrap and `redirect_url` is where the gateway sends the customer
    /// (with the encrypted payload) once the payment completes.
    pub fn new(config: &GatewayConfig, details: &CheckoutDetails, token: &str, redirect_url: &str) -> Self {
        let total_amount = details.total_amount.to_string();
        let checksum = calculate_checksum(&details.buyer_name, &config.ag_token, &details.order_no, &total_amount);
        let bank_code = non_empty(&details.bank_code);
        let msg_token = non_empty(&details.msg_token);
        let gateway = match (bank_code, msg_token) {
            (Some(_), Some(_)) => GATEWAY_CODE_DIRECT_BANK,
            _ => GATEWAY_CODE_DEFAULT,
        };
        let mut fields = Vec::with_capacity(15);
        fields.push(("jp_buyer_name", details.buyer_name.clone()));
        if let Some(code) = bank_code {
            fields.push(("jp_bank_code", code.to_string()));
        }
        fields.push(("jp_token", token.to_string()));
        fields.push(("jp_ag_token", config.ag_token.clone()));
        fields.push(("bill_id", details.order_no.clone()));
        fields.push(("jp_order_no", details.order_no.clone()));
        if let Some(t) = msg_token {
            fields.push(("jp_msg_token", t.to_string()));
        }
        fields.push(("jp_total_amount", total_amount));
        fields.push(("jp_product_id", details.product_id.clone()));
        fields.push(("jp_product_desc", details.product_desc.clone()));
        fields.push(("jp_email", details.email.clone()));
        fields.push(("method", METHOD_GET_REDIRECT_URL.to_string()));
        fields.push(("jp_redirect_url", redirect_url.to_string()));
        fields.push(("jp_checksum", checksum));
        fields.push(("jp_gateway", gateway.to_string()));
        Self { action: config.gateway_url.clone(), fields }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }

    /// An HTML page that posts the form to the gateway as soon as it loads.
    pub fn to_html(&self) -> String {
        let inputs = self
            .fields
            .iter()
            .map(|(k, v)| format!("    <input type=\"hidden\" name=\"{k}\" value=\"{}\" />", escape_html(v)))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8" /><title>Redirecting to payment</title></head>
<body onload="document.forms['gateway'].submit()">
  <form name="gateway" method="post" action="{action}">
{inputs}
    <noscript><button type="submit">Continue to payment</button></noscript>
  </form>
</body>
</html>
"#,
            action = escape_html(&self.action)
        )
    }
}
