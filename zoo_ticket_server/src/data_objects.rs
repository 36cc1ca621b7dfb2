use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::errors::codes;

/// The `{respCode, respDesc, result}` envelope wrapped around every JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub resp_code: u32,
    pub resp_desc: String,
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(result: T) -> Self {
        Self { resp_code: codes::SUCCESS, resp_desc: "Success".to_string(), result: Some(result) }
    }

    pub fn failure<S: Display>(resp_code: u32, message: S) -> Self {
        Self { resp_code, resp_desc: message.to_string(), result: None }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub cust_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIdQuery {
    pub order_ticket_group_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankListQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuery {
    pub order_ticket_group_id: Option<i64>,
    pub bank_code: Option<String>,
    pub msg_token: Option<String>,
}
