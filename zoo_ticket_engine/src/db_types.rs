//! Data types that are stored in, or read from, the order database.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
pub use ztg_common::Cents;

//--------------------------------------        OrderNo        ---------------------------------------------------------
/// The gateway-facing order number. It doubles as `bill_id` and `jp_order_no` in the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNo(pub String);

impl FromStr for OrderNo {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNo {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderNo {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderNo {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     OrderStatus       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// The order has been created and is waiting for the gateway to report the outcome of the payment.
    Pending,
    /// The payment was approved. This status is final.
    Success,
    /// The payment was declined or abandoned. This status is final.
    Failed,
}

impl OrderStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Success => write!(f, "success"),
            OrderStatus::Failed => write!(f, "failed"),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to pending");
            OrderStatus::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   OrderTicketGroup    ---------------------------------------------------------
/// One purchase transaction.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTicketGroup {
    #[serde(rename = "orderTicketGroupId")]
    pub id: i64,
    pub order_no: OrderNo,
    pub cust_id: i64,
    pub ticket_group_id: i64,
    pub ticket_group_name: String,
    pub buyer_name: String,
    pub email: String,
    pub identification_no: String,
    pub contact_no: String,
    pub total_amount: Cents,
    pub payment_method: String,
    pub payment_type: String,
    pub status: OrderStatus,
    pub transaction_id: Option<String>,
    pub transaction_date: Option<String>,
    pub bank_code: Option<String>,
    pub bank_name: Option<String>,
    pub status_message: Option<String>,
    pub is_email_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem        ---------------------------------------------------------
/// A line item: one variant of the ticket group, with a quantity and entry date.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    #[serde(rename = "orderTicketGroupId")]
    pub order_id: i64,
    pub ticket_variant_id: i64,
    pub variant_name: String,
    pub quantity: i64,
    pub entry_date: NaiveDate,
    pub unit_price: Cents,
    pub total: Cents,
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderTicketGroup,
    pub items: Vec<OrderItem>,
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub ticket_variant_id: i64,
    pub variant_name: String,
    pub quantity: i64,
    pub entry_date: NaiveDate,
    pub unit_price: Cents,
}

impl NewOrderItem {
    /// `unit_price × quantity`, or `None` when the line total is not representable.
    pub fn total(&self) -> Option<Cents> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// A fully validated order, ready to be persisted. The order number is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub cust_id: i64,
    pub ticket_group_id: i64,
    pub ticket_group_name: String,
    pub buyer_name: String,
    pub email: String,
    pub identification_no: String,
    pub contact_no: String,
    pub payment_method: String,
    pub payment_type: String,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// The order total is always the sum of the line totals. `None` if any of them, or the sum, overflows.
    pub fn total_amount(&self) -> Option<Cents> {
        self.items.iter().try_fold(Cents::default(), |acc, item| acc.checked_add(item.total()?))
    }
}

//--------------------------------------   Status update       ---------------------------------------------------------
/// What the payment callback writes to an order.
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub status: Option<OrderStatus>,
    pub transaction_id: Option<String>,
    pub transaction_date: Option<String>,
    pub bank_code: Option<String>,
    pub bank_name: Option<String>,
    pub status_message: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: OrderStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    pub fn with_transaction_id<S: Into<String>>(mut self, id: S) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    pub fn with_transaction_date<S: Into<String>>(mut self, date: S) -> Self {
        self.transaction_date = Some(date.into());
        self
    }

    pub fn with_bank<S: Into<String>>(mut self, code: S, name: S) -> Self {
        self.bank_code = Some(code.into());
        self.bank_name = Some(name.into());
        self
    }

    pub fn with_status_message<S: Into<String>>(mut self, message: S) -> Self {
        self.status_message = Some(message.into());
        self
    }

    pub fn status(&self) -> OrderStatus {
        self.status.unwrap_or(OrderStatus::Pending)
    }
}

/// The outcome of a conditional status update.
#[derive(Debug, Clone)]
pub enum StatusUpdateResult {
    /// This call moved the order out of `pending`. Exactly one caller ever sees this for a given order.
    Transitioned(OrderTicketGroup),
    /// The order is still pending. Gateway fields were refreshed.
    StillPending(OrderTicketGroup),
    /// The order had already reached a final status. Nothing was written.
    AlreadyFinal(OrderTicketGroup),
}

impl StatusUpdateResult {
    pub fn order(&self) -> &OrderTicketGroup {
        match self {
            StatusUpdateResult::Transitioned(o) => o,
            StatusUpdateResult::StillPending(o) => o,
            StatusUpdateResult::AlreadyFinal(o) => o,
        }
    }

    pub fn into_order(self) -> OrderTicketGroup {
        match self {
            StatusUpdateResult::Transitioned(o) => o,
            StatusUpdateResult::StillPending(o) => o,
            StatusUpdateResult::AlreadyFinal(o) => o,
        }
    }
}

//--------------------------------------       Customer        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "custId")]
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub identification_no: String,
    pub contact_no: String,
    #[serde(skip)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub email: String,
    pub full_name: String,
    pub identification_no: String,
    pub contact_no: String,
}

//--------------------------------------    Ticket catalog     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketVariant {
    pub id: i64,
    pub ticket_group_id: i64,
    pub name: String,
    pub unit_price: Cents,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketGroup {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(skip)]
    pub variants: Vec<TicketVariant>,
}

impl TicketGroup {
    pub fn variant(&self, id: i64) -> Option<&TicketVariant> {
        self.variants.iter().find(|v| v.id == id)
    }
}
