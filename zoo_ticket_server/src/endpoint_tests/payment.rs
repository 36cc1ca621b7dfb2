use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;
use wiremock::{
    matchers::{body_string_contains, header, method},
    Mock,
    MockServer,
    ResponseTemplate,
};
use zoo_ticket_engine::{
    db_types::{OrderNo, OrderStatus, StatusUpdate},
    traits::{FulfillmentError, FulfillmentResult, ItemSummary, OrderManagement, TicketArtifact, TicketEmail},
};

use super::{
    helpers::{
        call,
        callback_payload,
        create_customer,
        gateway_config,
        init_app,
        place_order,
        test_db,
        AG_TOKEN,
        API_KEY,
        FRONTEND,
        PUBLIC_URL,
    },
    mocks::{MockFulfillment, MockMailer},
};

const NO_GATEWAY: &str = "http://127.0.0.1:9/api";

fn fulfilled(order_no: &OrderNo) -> FulfillmentResult {
    FulfillmentResult {
        items: vec![ItemSummary { description: "Adult".into(), entry_date: "2024-06-01".into(), quantity: 2 }],
        tickets: (1..=2)
            .map(|i| TicketArtifact {
                ticket_code: format!("{order_no}-{i}"),
                description: "Adult".into(),
                entry_date: "2024-06-01".into(),
            })
            .collect(),
    }
}

fn return_uri(payload: &str) -> String {
    format!("/payment/return?payload={payload}")
}

#[actix_web::test]
async fn successful_payment_is_fulfilled_once() {
    let (db, catalog) = test_db().await;
    let siti = create_customer(&db, "siti@example.com").await;
    let order = place_order(&db, &catalog, siti).await;
    let expected_no = order.order_no.clone();
    let mut fulfillment = MockFulfillment::new();
    fulfillment.expect_fulfil_order().times(1).withf(move |no| *no == expected_no).returning(|no| Ok(fulfilled(no)));
    let mut mailer = MockMailer::new();
    mailer
        .expect_send_tickets()
        .times(1)
        .withf(|email: &TicketEmail| {
            email.to == "siti@example.com" &&
                email.tickets.len() == 2 &&
                email.ticket_group_name == "Family Pass" &&
                email.quantity_description() == "2 x Adult"
        })
        .returning(|_| Ok(()));
    let app = init_app(db.clone(), fulfillment, mailer, gateway_config(NO_GATEWAY)).await;

    let payload = callback_payload(&order.order_no, "00");
    let res = call(&app, TestRequest::get().uri(&return_uri(&payload)).to_request()).await;
    assert_eq!(res.status, StatusCode::FOUND);
    let expected = format!(
        "{FRONTEND}/paymentRedirect?orderTicketGroupId={}&transactionStatus=success&orderNo={}",
        order.id, order.order_no
    );
    assert_eq!(res.location.as_deref(), Some(expected.as_str()));
    let stored = db.fetch_order_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Success);
    assert!(stored.is_email_sent);
    assert_eq!(stored.transaction_id.as_deref(), Some(format!("TX-{}", order.order_no).as_str()));
    assert_eq!(stored.bank_name.as_deref(), Some("Maybank"));

    // The gateway repeats itself. No second fulfillment or email (enforced by `times(1)`)
    let res = call(&app, TestRequest::get().uri(&return_uri(&payload)).to_request()).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location.as_deref(), Some(expected.as_str()));
}

#[actix_web::test]
async fn failed_fulfillment_still_redirects() {
    let (db, catalog) = test_db().await;
    let siti = create_customer(&db, "siti@example.com").await;
    let order = place_order(&db, &catalog, siti).await;
    let mut fulfillment = MockFulfillment::new();
    fulfillment
        .expect_fulfil_order()
        .times(1)
        .returning(|_| Err(FulfillmentError::Network("connection refused".into())));
    let mut mailer = MockMailer::new();
    mailer.expect_send_tickets().never();
    let app = init_app(db.clone(), fulfillment, mailer, gateway_config(NO_GATEWAY)).await;

    let res = call(&app, TestRequest::get().uri(&return_uri(&callback_payload(&order.order_no, "00"))).to_request()).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert!(res.location.unwrap().contains("transactionStatus=success"));
    let stored = db.fetch_order_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Success);
    assert!(!stored.is_email_sent);
}

#[actix_web::test]
async fn declined_and_pending_payments() {
    let (db, catalog) = test_db().await;
    let siti = create_customer(&db, "siti@example.com").await;
    let pending = place_order(&db, &catalog, siti).await;
    let declined = place_order(&db, &catalog, siti).await;
    let mut fulfillment = MockFulfillment::new();
    fulfillment.expect_fulfil_order().never();
    let mut mailer = MockMailer::new();
    mailer.expect_send_tickets().never();
    let app = init_app(db.clone(), fulfillment, mailer, gateway_config(NO_GATEWAY)).await;

    let res = call(&app, TestRequest::get().uri(&return_uri(&callback_payload(&pending.order_no, "09"))).to_request()).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert!(res.location.unwrap().contains("transactionStatus=pending"));

    let res =
        call(&app, TestRequest::get().uri(&return_uri(&callback_payload(&declined.order_no, "51"))).to_request()).await;
    assert!(res.location.unwrap().contains("transactionStatus=failed"));
    // A late success report cannot revive a failed order
    let res =
        call(&app, TestRequest::get().uri(&return_uri(&callback_payload(&declined.order_no, "00"))).to_request()).await;
    assert!(res.location.unwrap().contains("transactionStatus=failed"));
    assert_eq!(db.fetch_order_by_id(declined.id).await.unwrap().unwrap().status, OrderStatus::Failed);
}

#[actix_web::test]
async fn invalid_callbacks() {
    let (db, _) = test_db().await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;

    let res = call(&app, TestRequest::get().uri("/payment/return").to_request()).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.resp_code(), 4005);

    let res = call(&app, TestRequest::get().uri("/payment/return?payload=bm90:YW4gZW52ZWxvcGU%3D").to_request()).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.resp_code(), 4005);
    assert_eq!(res.json()["respDesc"], "Invalid payment response");

    let unknown = OrderNo::from("NoSuchOrder00000");
    let res = call(&app, TestRequest::get().uri(&return_uri(&callback_payload(&unknown, "00"))).to_request()).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.resp_code(), 5003);
}

#[actix_web::test]
async fn bank_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("jp-api-key", API_KEY))
        .and(body_string_contains("method=getBankList"))
        .and(body_string_contains("mode=02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": "[{\"code\":\"MBB0227\",\"name\":\"Maybank2E\"},{\"code\":\"BCBB0235\",\"name\":\"CIMB Clicks\"}]"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let (db, _) = test_db().await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(&server.uri())).await;

    let res = call(&app, TestRequest::get().uri("/payment/banks?mode=02").to_request()).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["respCode"], 2000);
    assert_eq!(body["result"][1]["name"], "CIMB Clicks");
}

#[actix_web::test]
async fn bank_list_gateway_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(503)).mount(&server).await;
    let (db, _) = test_db().await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(&server.uri())).await;

    let res = call(&app, TestRequest::get().uri("/payment/banks").to_request()).await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.resp_code(), 5002);
}

#[actix_web::test]
async fn checkout_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("method=getRedirectUrl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "response_msg": {"rand_key": "RK-7781"}
        })))
        .mount(&server)
        .await;
    let (db, catalog) = test_db().await;
    let siti = create_customer(&db, "siti@example.com").await;
    let order = place_order(&db, &catalog, siti).await;
    let paid = place_order(&db, &catalog, siti).await;
    db.update_order_status(&paid.order_no, StatusUpdate::new(OrderStatus::Success)).await.unwrap();
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(&server.uri())).await;

    let uri = format!("/payment/checkout?orderTicketGroupId={}&bankCode=MBB0227&msgToken=01", order.id);
    let res = call(&app, TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status, StatusCode::OK);
    let html = res.body;
    assert!(html.contains(r#"action="https://gateway.example/pay""#));
    assert!(html.contains(r#"name="jp_token" value="RK-7781""#));
    assert!(html.contains(&format!(r#"name="jp_ag_token" value="{AG_TOKEN}""#)));
    assert!(html.contains(&format!(r#"name="jp_order_no" value="{}""#, order.order_no)));
    assert!(html.contains(r#"name="jp_total_amount" value="70.00""#));
    assert!(html.contains(&format!(r#"name="jp_product_id" value="{}""#, catalog.family_pass)));
    assert!(html.contains(r#"name="jp_product_desc" value="Family Pass""#));
    assert!(html.contains(&format!(r#"name="jp_redirect_url" value="{PUBLIC_URL}/payment/return""#)));
    assert!(html.contains(r#"name="jp_gateway" value="2""#));

    let uri = format!("/payment/checkout?orderTicketGroupId={}", paid.id);
    let res = call(&app, TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.resp_code(), 4002);

    let res = call(&app, TestRequest::get().uri("/payment/checkout").to_request()).await;
    assert_eq!(res.resp_code(), 4001);
}
