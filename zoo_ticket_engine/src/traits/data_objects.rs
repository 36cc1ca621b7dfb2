use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{OrderNo, OrderTicketGroup};

/// A per-seat ticket issued by the ticketing system. `ticket_code` is what goes into the QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketArtifact {
    pub ticket_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entry_date: String,
}

/// One line of the order summary shown in the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub description: String,
    #[serde(default)]
    pub entry_date: String,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResult {
    #[serde(default)]
    pub items: Vec<ItemSummary>,
    #[serde(default)]
    pub tickets: Vec<TicketArtifact>,
}

/// Everything the mailer needs to render and address the ticket email.
#[derive(Debug, Clone)]
pub struct TicketEmail {
    pub to: String,
    pub buyer_name: String,
    pub order_no: OrderNo,
    pub ticket_group_name: String,
    pub purchase_date: DateTime<Utc>,
    pub entry_date: String,
    pub items: Vec<ItemSummary>,
    pub tickets: Vec<TicketArtifact>,
}

impl TicketEmail {
    pub fn new(order: &OrderTicketGroup, items: Vec<ItemSummary>, tickets: Vec<TicketArtifact>) -> Self {
        let entry_date = items
            .first()
            .map(|i| i.entry_date.clone())
            .or_else(|| tickets.first().map(|t| t.entry_date.clone()))
            .unwrap_or_default();
        Self {
            to: order.email.clone(),
            buyer_name: order.buyer_name.clone(),
            order_no: order.order_no.clone(),
            ticket_group_name: order.ticket_group_name.clone(),
            purchase_date: order.created_at,
            entry_date,
            items,
            tickets,
        }
    }

    /// E.g. "2 x Adult, 1 x Child".
    pub fn quantity_description(&self) -> String {
        self.items
            .iter()
            .map(|i| if i.quantity > 0 { format!("{} x {}", i.quantity, i.description) } else { i.description.clone() })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
