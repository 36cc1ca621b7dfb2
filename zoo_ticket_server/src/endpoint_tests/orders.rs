use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::{json, Value};
use zoo_ticket_engine::traits::{CustomerManagement, OrderManagement};

use super::{
    helpers::{bearer, call, create_customer, gateway_config, init_app, place_order, test_db, token_for, FRONTEND},
    mocks::{MockFulfillment, MockMailer},
};
use crate::auth::UserType;

const NO_GATEWAY: &str = "http://127.0.0.1:9/api";

fn order_body(group: i64, variant: i64) -> Value {
    json!({
        "ticketGroupId": group,
        "items": [{"ticketVariantId": variant, "quantity": 2, "entryDate": "2024-06-01"}],
        "paymentMethod": "fpx",
        "paymentType": "online banking"
    })
}

fn with_buyer(mut body: Value, email: &str) -> Value {
    body["email"] = json!(email);
    body["identificationNo"] = json!("900101-01-1234");
    body["fullName"] = json!("Ahmad Guest");
    body["contactNo"] = json!("0123456789");
    body
}

#[actix_web::test]
async fn health_check() {
    let (db, _) = test_db().await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    let res = call(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "👍️\n");
}

#[actix_web::test]
async fn listing_orders_requires_a_token() {
    let (db, _) = test_db().await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    let res = call(&app, TestRequest::get().uri("/api/orderTicketGroups").to_request()).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.resp_code(), 4003);
    assert_eq!(res.json()["result"], Value::Null);
}

#[actix_web::test]
async fn listing_orders_with_a_bad_token() {
    let (db, _) = test_db().await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    let mut token = token_for(1, UserType::Admin);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let req = TestRequest::get().uri("/api/orderTicketGroups").insert_header(bearer(&token)).to_request();
    let res = call(&app, req).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.resp_code(), 4007);
}

#[actix_web::test]
async fn listing_orders_with_an_unknown_user_type() {
    let (db, _) = test_db().await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    let req = TestRequest::get()
        .uri("/api/orderTicketGroups")
        .insert_header(bearer(&token_for(5, UserType::Other)))
        .to_request();
    let res = call(&app, req).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.resp_code(), 4011);
}

#[actix_web::test]
async fn customers_list_their_own_orders() {
    let (db, catalog) = test_db().await;
    let siti = create_customer(&db, "siti@example.com").await;
    let other = create_customer(&db, "other@example.com").await;
    let mine = place_order(&db, &catalog, siti).await;
    place_order(&db, &catalog, other).await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;

    let token = token_for(siti, UserType::Customer);
    let req = TestRequest::get().uri("/api/orderTicketGroups").insert_header(bearer(&token)).to_request();
    let res = call(&app, req).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["respCode"], 2000);
    assert_eq!(body["respDesc"], "Success");
    let orders = body["result"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["orderTicketGroupId"], mine.id);
    assert_eq!(orders[0]["orderNo"], mine.order_no.as_str());
    assert_eq!(orders[0]["status"], "pending");

    let uri = format!("/api/orderTicketGroups?custId={other}");
    let req = TestRequest::get().uri(&uri).insert_header(bearer(&token)).to_request();
    let res = call(&app, req).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.resp_code(), 4011);
}

#[actix_web::test]
async fn admins_list_all_orders() {
    let (db, catalog) = test_db().await;
    let siti = create_customer(&db, "siti@example.com").await;
    let other = create_customer(&db, "other@example.com").await;
    place_order(&db, &catalog, siti).await;
    place_order(&db, &catalog, siti).await;
    place_order(&db, &catalog, other).await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    let token = token_for(1000, UserType::Admin);

    let req = TestRequest::get().uri("/api/orderTicketGroups").insert_header(bearer(&token)).to_request();
    let res = call(&app, req).await;
    assert_eq!(res.json()["result"].as_array().unwrap().len(), 3);

    let uri = format!("/api/orderTicketGroups?custId={siti}");
    let req = TestRequest::get().uri(&uri).insert_header(bearer(&token)).to_request();
    let res = call(&app, req).await;
    let orders = res.json()["result"].as_array().unwrap().clone();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o["custId"] == siti));
}

#[actix_web::test]
async fn fetch_single_order() {
    let (db, catalog) = test_db().await;
    let siti = create_customer(&db, "siti@example.com").await;
    let order = place_order(&db, &catalog, siti).await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;

    let uri = format!("/api/orderTicketGroup?orderTicketGroupId={}", order.id);
    let res = call(&app, TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status, StatusCode::OK);
    let result = &res.json()["result"];
    assert_eq!(result["orderTicketGroupId"], order.id);
    assert_eq!(result["totalAmount"], "70.00");
    assert_eq!(result["items"].as_array().unwrap().len(), 1);
    assert_eq!(result["items"][0]["variantName"], "Adult");

    let res = call(&app, TestRequest::get().uri("/api/orderTicketGroup?orderTicketGroupId=9999").to_request()).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.resp_code(), 5003);

    let res = call(&app, TestRequest::get().uri("/api/orderTicketGroup").to_request()).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.resp_code(), 4001);

    let res = call(&app, TestRequest::get().uri("/api/orderTicketGroup?orderTicketGroupId=abc").to_request()).await;
    assert_eq!(res.resp_code(), 4000);
}

#[actix_web::test]
async fn guest_order() {
    let (db, catalog) = test_db().await;
    let app = init_app(db.clone(), MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    let body = with_buyer(order_body(catalog.family_pass, catalog.adult), "ahmad@example.com");
    let res = call(&app, TestRequest::post().uri("/api/orderTicketGroup").set_json(body).to_request()).await;
    assert_eq!(res.status, StatusCode::OK);
    let result = res.json()["result"].clone();
    let id = result["orderID"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(result["redirectURL"], format!("{FRONTEND}/checkout.html?orderID={id}&paymentType=online%20banking"));

    let order = db.fetch_order_by_id(id).await.unwrap().unwrap();
    assert_eq!(order.email, "ahmad@example.com");
    assert_eq!(order.total_amount.to_string(), "70.00");
    let customer = db.fetch_customer_by_email("ahmad@example.com").await.unwrap().expect("guest was registered");
    assert_eq!(order.cust_id, customer.id);
}

#[actix_web::test]
async fn signed_in_customer_order() {
    let (db, catalog) = test_db().await;
    let siti = create_customer(&db, "siti@example.com").await;
    let app = init_app(db.clone(), MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    // No buyer fields: they come from the customer record
    let req = TestRequest::post()
        .uri("/api/orderTicketGroup")
        .insert_header(bearer(&token_for(siti, UserType::Customer)))
        .set_json(order_body(catalog.night_safari, catalog.night_adult))
        .to_request();
    let res = call(&app, req).await;
    assert_eq!(res.status, StatusCode::OK);
    let id = res.json()["result"]["orderID"].as_i64().unwrap();
    let order = db.fetch_order_by_id(id).await.unwrap().unwrap();
    assert_eq!(order.cust_id, siti);
    assert_eq!(order.email, "siti@example.com");
    assert_eq!(order.buyer_name, "Siti Aminah");
    assert_eq!(order.total_amount.to_string(), "100.00");
}

#[actix_web::test]
async fn admins_order_as_guests() {
    let (db, catalog) = test_db().await;
    let app = init_app(db.clone(), MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    let admin = bearer(&token_for(1, UserType::Admin));
    let req = TestRequest::post()
        .uri("/api/orderTicketGroup")
        .insert_header(admin.clone())
        .set_json(order_body(catalog.family_pass, catalog.child))
        .to_request();
    let res = call(&app, req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.resp_code(), 4001);

    let body = with_buyer(order_body(catalog.family_pass, catalog.child), "counter@example.com");
    let req = TestRequest::post().uri("/api/orderTicketGroup").insert_header(admin).set_json(body).to_request();
    let res = call(&app, req).await;
    assert_eq!(res.status, StatusCode::OK);
    let id = res.json()["result"]["orderID"].as_i64().unwrap();
    assert_eq!(db.fetch_order_by_id(id).await.unwrap().unwrap().email, "counter@example.com");
}

#[actix_web::test]
async fn invalid_orders() {
    let (db, catalog) = test_db().await;
    let app = init_app(db, MockFulfillment::new(), MockMailer::new(), gateway_config(NO_GATEWAY)).await;
    let post = |body: Value| TestRequest::post().uri("/api/orderTicketGroup").set_json(body).to_request();

    let mut body = with_buyer(order_body(catalog.family_pass, catalog.adult), "a@example.com");
    body["items"] = json!([]);
    assert_eq!(call(&app, post(body)).await.resp_code(), 4001);

    let mut body = with_buyer(order_body(catalog.family_pass, catalog.adult), "a@example.com");
    body["items"][0]["quantity"] = json!(0);
    assert_eq!(call(&app, post(body)).await.resp_code(), 4002);

    let mut body = with_buyer(order_body(catalog.family_pass, catalog.adult), "a@example.com");
    body["items"][0]["quantity"] = json!(i64::MAX / 100);
    assert_eq!(call(&app, post(body)).await.resp_code(), 4002);

    let mut body = with_buyer(order_body(catalog.family_pass, catalog.adult), "a@example.com");
    body["items"][0]["entryDate"] = json!("01/06/2024");
    assert_eq!(call(&app, post(body)).await.resp_code(), 4002);

    // The variant belongs to another ticket group
    let body = with_buyer(order_body(catalog.family_pass, catalog.night_adult), "a@example.com");
    assert_eq!(call(&app, post(body)).await.resp_code(), 4002);

    let body = with_buyer(order_body(catalog.family_pass, catalog.adult), "not-an-email");
    assert_eq!(call(&app, post(body)).await.resp_code(), 4002);

    let req = TestRequest::post()
        .uri("/api/orderTicketGroup")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = call(&app, req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.resp_code(), 4000);
}
