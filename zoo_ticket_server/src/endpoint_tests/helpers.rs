use std::time::Duration;

use actix_http::Request;
use actix_web::{
    body::to_bytes,
    dev::{Service, ServiceResponse},
    http::{header::LOCATION, StatusCode},
    test,
    web,
    App,
    ResponseError,
};
use chrono::NaiveDate;
use gateway_tools::{GatewayConfig, PaymentGatewayApi};
use log::debug;
use serde_json::Value;
use ztg_common::Secret;
use zoo_ticket_engine::{
    db_types::{Cents, NewCustomer, NewOrder, NewOrderItem, OrderNo, OrderTicketGroup},
    helpers::EnvelopeCodec,
    test_utils::prepare_env::{prepare_test_env, random_db_path, seed_catalog, TestCatalog},
    traits::{CustomerManagement, OrderManagement},
    OrderFlowApi,
    OrderFlowConfig,
    OrderQueryApi,
    SqliteDatabase,
};

use super::mocks::{MockFulfillment, MockMailer};
use crate::{
    auth::{JwtClaims, TokenIssuer, TokenVerifier, UserType},
    config::{AuthConfig, CheckoutOptions},
    server::configure_api,
};

pub const API_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const FRONTEND: &str = "https://zoo.example";
pub const PUBLIC_URL: &str = "https://api.zoo.example";
pub const AG_TOKEN: &str = "ZOO-MERCHANT-01";
// DO NOT re-use this secret anywhere.
const JWT_SECRET: &str = "endpoint-tests-only-5b0f3c8e9d1a";

pub fn auth_config() -> AuthConfig {
    AuthConfig::new(Secret::new(JWT_SECRET.to_string()))
}

pub fn token_for(user_id: i64, user_type: UserType) -> String {
    TokenIssuer::new(&auth_config()).issue_access_token(JwtClaims::new(user_id, user_type)).expect("Failed to sign token")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn gateway_config(api_url: &str) -> GatewayConfig {
    GatewayConfig {
        gateway_url: "https://gateway.example/pay".into(),
        api_url: api_url.into(),
        api_key: Secret::new(API_KEY.to_string()),
        ag_token: AG_TOKEN.into(),
        timeout: Duration::from_secs(5),
    }
}

/// A callback payload sealed with the test key, the way the gateway builds it.
pub fn callback_payload(order_no: &OrderNo, status_code: &str) -> String {
    let plaintext = serde_json::json!({
        "id_transaksi": format!("TX-{order_no}"),
        "order_no": order_no.as_str(),
        "status_transaksi": status_code,
        "status_message": "endpoint test",
        "tarikh_transaksi": "2024-06-01 10:00:00",
        "kod_bank": "MBB",
        "nama_bank": "Maybank",
        "jp_msg_token": ""
    })
    .to_string();
    let payload = EnvelopeCodec::new(Secret::new(API_KEY.to_string())).seal(&[7u8; 16], plaintext.as_bytes()).unwrap();
    urlencoding::encode(&payload).into_owned()
}

pub async fn test_db() -> (SqliteDatabase, TestCatalog) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to test database");
    let catalog = seed_catalog(&db).await;
    (db, catalog)
}

pub async fn create_customer(db: &SqliteDatabase, email: &str) -> i64 {
    let customer = NewCustomer {
        email: email.into(),
        full_name: "Siti Aminah".into(),
        identification_no: "880808-08-8888".into(),
        contact_no: "0198887777".into(),
    };
    db.fetch_or_create_customer(customer).await.expect("Error creating customer").id
}

/// Stores a pending Family Pass order (2 adults) for `cust_id`.
pub async fn place_order(db: &SqliteDatabase, catalog: &TestCatalog, cust_id: i64) -> OrderTicketGroup {
    let order = NewOrder {
        cust_id,
        ticket_group_id: catalog.family_pass,
        ticket_group_name: "Family Pass".into(),
        buyer_name: "Siti Aminah".into(),
        email: "siti@example.com".into(),
        identification_no: "880808-08-8888".into(),
        contact_no: "0198887777".into(),
        payment_method: "fpx".into(),
        payment_type: "online".into(),
        items: vec![NewOrderItem {
            ticket_variant_id: catalog.adult,
            variant_name: "Adult".into(),
            quantity: 2,
            entry_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            unit_price: Cents::from(3500),
        }],
    };
    db.create_order(order).await.expect("Error creating order")
}

pub async fn init_app(
    db: SqliteDatabase,
    fulfillment: MockFulfillment,
    mailer: MockMailer,
    gateway: GatewayConfig,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let config = OrderFlowConfig { frontend_base_url: FRONTEND.to_string(), ..Default::default() };
    let codec = EnvelopeCodec::new(Secret::new(API_KEY.to_string()));
    let flow_api = OrderFlowApi::new(db.clone(), fulfillment, mailer, codec, config);
    let query_api = OrderQueryApi::new(db);
    let gateway = PaymentGatewayApi::new(gateway).expect("Error creating gateway client");
    let verifier = TokenVerifier::new(&auth_config());
    let app = App::new()
        .app_data(web::Data::new(flow_api))
        .app_data(web::Data::new(query_api))
        .app_data(web::Data::new(gateway))
        .app_data(web::Data::new(CheckoutOptions::new(PUBLIC_URL)))
        .configure(|cfg| configure_api::<SqliteDatabase, MockFulfillment, MockMailer>(cfg, verifier));
    test::init_service(app).await
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {}", self.body))
    }

    pub fn resp_code(&self) -> u64 {
        self.json()["respCode"].as_u64().expect("respCode missing")
    }
}

/// Calls the service and collects the response. Errors raised by middleware are rendered the way the server would.
pub async fn call<S>(service: &S, req: Request) -> TestResponse
where S: Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    match test::try_call_service(service, req).await {
        Ok(res) => {
            let status = res.status();
            let location = res.headers().get(LOCATION).map(|v| v.to_str().unwrap().to_string());
            let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
            debug!("Response {status}: {body}");
            TestResponse { status, location, body }
        },
        Err(e) => {
            let res = e.as_response_error().error_response();
            let status = res.status();
            let body = String::from_utf8_lossy(&to_bytes(res.into_body()).await.unwrap()).into_owned();
            debug!("Middleware error {status}: {body}");
            TestResponse { status, location: None, body }
        },
    }
}
