use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::Value;
use shop_payment_engine::{
    db_types::Role,
    traits::StorefrontError,
    OrderFlowApi,
    OrderQueryApi,
};

use super::{
    helpers::{issue_token, send},
    mocks::{pending_order, MockOrderStore, TestBackend, TestGateway},
};
use crate::routes::{MyOrdersRoute, OrderByIdRoute, PlaceOrderRoute, UpdateOrderStatusRoute};

fn flow_routes(backend: TestBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/order")
                .service(PlaceOrderRoute::<TestBackend, TestGateway>::new())
                .service(UpdateOrderStatusRoute::<TestBackend, TestGateway>::new()),
        )
        .app_data(web::Data::new(OrderFlowApi::new(backend, TestGateway::default())));
    }
}

fn query_routes(mock: MockOrderStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/order")
                .service(MyOrdersRoute::<MockOrderStore>::new())
                .service(OrderByIdRoute::<MockOrderStore>::new()),
        )
        .app_data(web::Data::new(OrderQueryApi::new(mock)));
    }
}

#[actix_web::test]
async fn placing_an_order_returns_the_payment_link() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let token = issue_token(42, vec![Role::User]);
    let (status, body) = send(TestRequest::post().uri("/order/place"), &token, flow_routes(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Order placed. Complete payment at the payment link.");
    let data = &json["data"];
    assert_eq!(data["orderCode"], "9F86D081A2");
    assert_eq!(data["totalAmount"], 2500);
    assert_eq!(data["status"], "Pending");
    assert_eq!(data["paymentUrl"], "https://pay.example.com/9F86D081A2");
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["items"][0]["quantity"], 2);
    assert_eq!(data["items"][0]["price"], 1000);
}

#[actix_web::test]
async fn placing_with_an_empty_cart_is_rejected() {
    let _ = env_logger::try_init();
    let backend = TestBackend::failing_with(StorefrontError::EmptyCart);
    let token = issue_token(42, vec![Role::User]);
    let (status, body) = send(TestRequest::post().uri("/order/place"), &token, flow_routes(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("empty cart"), "unexpected body: {body}");
}

#[actix_web::test]
async fn a_placement_failure_surfaces_its_cause() {
    let _ = env_logger::try_init();
    let backend = TestBackend::failing_with(StorefrontError::PlacementFailed(
        "The payment gateway rejected the request. Duplicate order code".to_string(),
    ));
    let token = issue_token(42, vec![Role::User]);
    let (status, body) = send(TestRequest::post().uri("/order/place"), &token, flow_routes(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Could not place the order"), "unexpected body: {body}");
    assert!(body.contains("Duplicate order code"), "the root cause should be reported: {body}");
}

#[actix_web::test]
async fn my_orders_come_back_in_an_envelope() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStore::new();
    mock.expect_fetch_orders_for_user().returning(|_| Ok(vec![pending_order("9F86D081A2")]));
    let token = issue_token(42, vec![Role::User]);
    let (status, body) = send(TestRequest::get().uri("/order/my-orders"), &token, query_routes(mock)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Orders retrieved");
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["orderCode"], "9F86D081A2");
}

#[actix_web::test]
async fn a_user_sees_their_own_order_by_id() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStore::new();
    mock.expect_fetch_order_by_id().returning(|_| Ok(Some(pending_order("9F86D081A2"))));
    let token = issue_token(42, vec![Role::User]);
    let (status, body) = send(TestRequest::get().uri("/order/1"), &token, query_routes(mock)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["userId"], 42);
}

#[actix_web::test]
async fn another_users_order_reads_as_absent() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStore::new();
    mock.expect_fetch_order_by_id().returning(|_| Ok(Some(pending_order("9F86D081A2"))));
    let token = issue_token(7, vec![Role::User]);
    let (status, body) = send(TestRequest::get().uri("/order/1"), &token, query_routes(mock)).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "unexpected body: {body}");
}

#[actix_web::test]
async fn admins_can_read_any_order() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStore::new();
    mock.expect_fetch_order_by_id().returning(|_| Ok(Some(pending_order("9F86D081A2"))));
    let token = issue_token(7, vec![Role::User, Role::Admin]);
    let (status, _) = send(TestRequest::get().uri("/order/1"), &token, query_routes(mock)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn the_status_override_requires_the_admin_role() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let token = issue_token(42, vec![Role::User]);
    let req = TestRequest::put().uri("/order/1/status").set_json(serde_json::json!({"status": "Cancelled"}));
    let (status, body) = send(req, &token, flow_routes(backend)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Insufficient Permissions"), "unexpected body: {body}");
}

#[actix_web::test]
async fn admins_can_override_the_status() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let token = issue_token(7, vec![Role::User, Role::Admin]);
    let req = TestRequest::put().uri("/order/1/status").set_json(serde_json::json!({"status": "Cancelled"}));
    let (status, body) = send(req, &token, flow_routes(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "Cancelled");
}

#[actix_web::test]
async fn an_unknown_status_string_is_rejected() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let token = issue_token(7, vec![Role::Admin]);
    let req = TestRequest::put().uri("/order/1/status").set_json(serde_json::json!({"status": "Shipped"}));
    let (status, body) = send(req, &token, flow_routes(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid order status"), "unexpected body: {body}");
}
