use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{OrderNo, OrderStatus},
    ticket_api::errors::OrderFlowError,
};

/// The body of `POST /api/orderTicketGroup`. Presence of required fields is checked by [`CreateOrderRequest::validate`]
/// so that a missing field is reported as such rather than as a malformed body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderRequest {
    pub ticket_group_id: Option<i64>,
    pub items: Vec<OrderItemRequest>,
    pub payment_method: Option<String>,
    pub payment_type: Option<String>,
    pub email: Option<String>,
    pub identification_no: Option<String>,
    pub full_name: Option<String>,
    pub contact_no: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItemRequest {
    pub ticket_variant_id: Option<i64>,
    pub quantity: i64,
    pub entry_date: String,
}

/// A line item that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidItem {
    pub ticket_variant_id: i64,
    pub quantity: i64,
    pub entry_date: NaiveDate,
}

/// A create-order request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidOrderRequest {
    pub ticket_group_id: i64,
    pub items: Vec<ValidItem>,
    pub payment_method: String,
    pub payment_type: String,
}

fn required(value: &Option<String>, name: &str) -> Result<String, OrderFlowError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| OrderFlowError::MissingField(name.to_string()))
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<ValidOrderRequest, OrderFlowError> {
        let ticket_group_id = self.ticket_group_id.ok_or_else(|| OrderFlowError::MissingField("ticketGroupId".into()))?;
        if self.items.is_empty() {
            return Err(OrderFlowError::MissingField("items".into()));
        }
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let ticket_variant_id = item
                    .ticket_variant_id
                    .ok_or_else(|| OrderFlowError::MissingField(format!("items[{i}].ticketVariantId")))?;
                if item.quantity < 1 {
                    return Err(OrderFlowError::InvalidValue(format!("items[{i}].quantity must be at least 1")));
                }
                let entry_date = NaiveDate::parse_from_str(item.entry_date.trim(), "%Y-%m-%d").map_err(|_| {
                    OrderFlowError::InvalidValue(format!("items[{i}].entryDate '{}' is not a YYYY-MM-DD date", item.entry_date))
                })?;
                Ok(ValidItem { ticket_variant_id, quantity: item.quantity, entry_date })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let payment_method = required(&self.payment_method, "paymentMethod")?;
        let payment_type = required(&self.payment_type, "paymentType")?;
        Ok(ValidOrderRequest { ticket_group_id, items, payment_method, payment_type })
    }

    pub fn buyer_details(&self) -> BuyerDetails {
        BuyerDetails {
            email: self.email.clone().unwrap_or_default(),
            identification_no: self.identification_no.clone().unwrap_or_default(),
            full_name: self.full_name.clone().unwrap_or_default(),
            contact_no: self.contact_no.clone().unwrap_or_default(),
        }
    }
}

/// Buyer fields supplied directly in a guest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyerDetails {
    pub email: String,
    pub identification_no: String,
    pub full_name: String,
    pub contact_no: String,
}

impl BuyerDetails {
    /// Guests must supply all four fields, and the email address must look like one.
    pub fn validate(&self) -> Result<BuyerDetails, OrderFlowError> {
        let field = |v: &str, name: &str| {
            let v = v.trim();
            if v.is_empty() {
                Err(OrderFlowError::MissingField(name.to_string()))
            } else {
                Ok(v.to_string())
            }
        };
        let email = field(&self.email, "email")?;
        let identification_no = field(&self.identification_no, "identificationNo")?;
        let full_name = field(&self.full_name, "fullName")?;
        let contact_no = field(&self.contact_no, "contactNo")?;
        if !is_plausible_email(&email) {
            return Err(OrderFlowError::InvalidValue(format!("'{email}' is not a valid email address")));
        }
        Ok(BuyerDetails { email, identification_no, full_name, contact_no })
    }
}

pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() &&
                !domain.contains('@') &&
                domain.contains('.') &&
                !domain.starts_with('.') &&
                !domain.ends_with('.') &&
                !email.chars().any(char::is_whitespace)
        },
        None => false,
    }
}

/// Who is placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// A signed-in customer. Buyer details come from the stored customer record.
    Authenticated(i64),
    /// Anyone else. Buyer details come from the request.
    Guest(BuyerDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
    #[serde(rename = "orderID")]
    pub order_id: i64,
}

/// Where the customer's browser goes after the gateway hands them back.
#[derive(Debug, Clone)]
pub struct PaymentRedirect {
    pub order_id: i64,
    pub order_no: OrderNo,
    pub status: OrderStatus,
    pub url: String,
}
