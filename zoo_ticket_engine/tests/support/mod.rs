#![allow(dead_code)]
use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc,
    Mutex,
};

use ztg_common::Secret;
use zoo_ticket_engine::{
    db_types::OrderNo,
    helpers::EnvelopeCodec,
    order_objects::{AuthContext, BuyerDetails, CreateOrderRequest, OrderItemRequest},
    test_utils::prepare_env::{prepare_test_env, random_db_path, seed_catalog, TestCatalog},
    traits::{
        FulfillmentError,
        FulfillmentProvider,
        FulfillmentResult,
        ItemSummary,
        MailerError,
        TicketArtifact,
        TicketEmail,
        TicketMailer,
    },
    OrderFlowApi,
    OrderFlowConfig,
    SqliteDatabase,
};

pub const API_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const FRONTEND: &str = "https://zoo.example";

/// A fresh, migrated database with the test catalog seeded.
pub async fn prepare_test_db() -> (SqliteDatabase, TestCatalog) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    let catalog = seed_catalog(&db).await;
    (db, catalog)
}

pub fn codec() -> EnvelopeCodec {
    EnvelopeCodec::new(Secret::new(API_KEY.to_string()))
}

/// Builds a callback payload the way the gateway would.
pub fn callback_payload(order_no: &OrderNo, status_code: &str) -> String {
    let plaintext = serde_json::json!({
        "id_transaksi": format!("TX-{order_no}"),
        "order_no": order_no.as_str(),
        "status_transaksi": status_code,
        "status_message": "test",
        "tarikh_transaksi": "2024-06-01 10:00:00",
        "kod_bank": "MBB",
        "nama_bank": "Maybank",
        "jp_msg_token": ""
    })
    .to_string();
    codec().seal(&[9u8; 16], plaintext.as_bytes()).unwrap()
}

pub fn guest() -> BuyerDetails {
    BuyerDetails {
        email: "guest@example.com".into(),
        identification_no: "900101-01-1234".into(),
        full_name: "Guest Buyer".into(),
        contact_no: "0123456789".into(),
    }
}

pub fn order_request(catalog: &TestCatalog, buyer: &BuyerDetails) -> CreateOrderRequest {
    CreateOrderRequest {
        ticket_group_id: Some(catalog.family_pass),
        items: vec![
            OrderItemRequest { ticket_variant_id: Some(catalog.adult), quantity: 2, entry_date: "2024-06-01".into() },
            OrderItemRequest { ticket_variant_id: Some(catalog.child), quantity: 1, entry_date: "2024-06-01".into() },
        ],
        payment_method: Some("fpx".into()),
        payment_type: Some("online banking".into()),
        email: Some(buyer.email.clone()),
        identification_no: Some(buyer.identification_no.clone()),
        full_name: Some(buyer.full_name.clone()),
        contact_no: Some(buyer.contact_no.clone()),
    }
}

pub fn guest_context(buyer: &BuyerDetails) -> AuthContext {
    AuthContext::Guest(buyer.clone())
}

//--------------------------------------   Counting fakes     ---------------------------------------------------------

#[derive(Clone, Default)]
pub struct CountingFulfillment {
    pub calls: Arc<AtomicI32>,
    pub fail: bool,
    pub no_items: bool,
    pub no_tickets: bool,
}

impl CountingFulfillment {
    pub fn count(&self) -> i32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FulfillmentProvider for CountingFulfillment {
    async fn fulfil_order(&self, order_no: &OrderNo) -> Result<FulfillmentResult, FulfillmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail {
            return Err(FulfillmentError::Network("connection refused".into()));
        }
        let items = if self.no_items {
            vec![]
        } else {
            vec![ItemSummary { description: "Adult".into(), entry_date: "2024-06-01".into(), quantity: 2 }]
        };
        let tickets = if self.no_tickets {
            vec![]
        } else {
            (1..=2)
                .map(|i| TicketArtifact {
                    ticket_code: format!("{order_no}-{i}"),
                    description: "Adult".into(),
                    entry_date: "2024-06-01".into(),
                })
                .collect()
        };
        Ok(FulfillmentResult { items, tickets })
    }
}

#[derive(Clone, Default)]
pub struct CountingMailer {
    pub sent: Arc<AtomicI32>,
    pub fail: bool,
    pub last: Arc<Mutex<Option<TicketEmail>>>,
}

impl CountingMailer {
    pub fn count(&self) -> i32 {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn last_email(&self) -> Option<TicketEmail> {
        self.last.lock().unwrap().clone()
    }
}

impl TicketMailer for CountingMailer {
    async fn send_tickets(&self, email: &TicketEmail) -> Result<(), MailerError> {
        if self.fail {
            return Err(MailerError::TransportError("smtp unavailable".into()));
        }
        self.sent.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(email.clone());
        Ok(())
    }
}

pub type TestFlowApi = OrderFlowApi<SqliteDatabase, CountingFulfillment, CountingMailer>;

pub fn flow_api(db: SqliteDatabase, fulfillment: CountingFulfillment, mailer: CountingMailer) -> TestFlowApi {
    let config = OrderFlowConfig { frontend_base_url: FRONTEND.to_string(), ..Default::default() };
    OrderFlowApi::new(db, fulfillment, mailer, codec(), config)
}
