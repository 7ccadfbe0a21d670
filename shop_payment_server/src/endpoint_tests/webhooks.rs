use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::Value;
use shop_payment_engine::{traits::GatewayPaymentStatus, OrderFlowApi};

use super::{
    helpers::send_public,
    mocks::{pending_order, TestBackend, TestGateway},
};
use crate::routes::{OrderWebhookRoute, PaymentStatusRoute, PaymentWebhookRoute};

fn webhook_routes(backend: TestBackend, gateway: TestGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(OrderWebhookRoute::<TestBackend, TestGateway>::new())
            .service(PaymentWebhookRoute::<TestBackend, TestGateway>::new())
            .service(PaymentStatusRoute::<TestBackend, TestGateway>::new())
            .app_data(web::Data::new(OrderFlowApi::new(backend, gateway)));
    }
}

#[actix_web::test]
async fn a_paid_notification_moves_the_order_to_processing() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let req = TestRequest::post()
        .uri("/order/webhook")
        .set_json(serde_json::json!({"orderCode": "9F86D081A2", "amount": 2500, "status": "PAID"}));
    let (status, body) = send_public(req, webhook_routes(backend.clone(), TestGateway::default())).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], 0);
    assert_eq!(backend.recorded_reconciliations(), vec![GatewayPaymentStatus::Paid]);
}

#[actix_web::test]
async fn an_unknown_order_is_still_acknowledged_with_a_success_shape() {
    let _ = env_logger::try_init();
    let backend = TestBackend::default();
    let req = TestRequest::post()
        .uri("/order/webhook")
        .set_json(serde_json::json!({"orderCode": "UNKNOWN", "status": "PAID"}));
    let (status, body) = send_public(req, webhook_routes(backend, TestGateway::default())).await;
    assert_eq!(status, StatusCode::OK, "the gateway must not be provoked into retrying: {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], -1);
    assert!(json["message"].as_str().unwrap().contains("UNKNOWN"), "unexpected body: {body}");
}

#[actix_web::test]
async fn a_notification_without_an_order_code_is_a_400() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let req = TestRequest::post().uri("/order/webhook").set_json(serde_json::json!({"status": "PAID"}));
    let (status, body) = send_public(req, webhook_routes(backend.clone(), TestGateway::default())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("no order code"), "unexpected body: {body}");
    assert!(backend.recorded_reconciliations().is_empty());
}

#[actix_web::test]
async fn the_payment_webhook_accepts_the_same_payload() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let req = TestRequest::post()
        .uri("/payment/webhook")
        .set_json(serde_json::json!({"orderCode": "9F86D081A2", "status": "CANCELLED"}));
    let (status, body) = send_public(req, webhook_routes(backend.clone(), TestGateway::default())).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], 0);
    assert_eq!(backend.recorded_reconciliations(), vec![GatewayPaymentStatus::Cancelled]);
}

#[actix_web::test]
async fn a_notification_without_a_status_asks_the_gateway() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let gateway = TestGateway { verify_status: Some(GatewayPaymentStatus::Paid) };
    let req = TestRequest::post().uri("/order/webhook").set_json(serde_json::json!({"orderCode": "9F86D081A2"}));
    let (status, _) = send_public(req, webhook_routes(backend.clone(), gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.recorded_reconciliations(), vec![GatewayPaymentStatus::Paid]);
}

#[actix_web::test]
async fn polling_a_known_code_reports_status_and_payment_url() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let req = TestRequest::get().uri("/payment/status/9F86D081A2");
    let (status, body) = send_public(req, webhook_routes(backend, TestGateway::default())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"orderCode":"9F86D081A2","status":"Pending","paymentUrl":"https://pay.example.com/9F86D081A2"}"#
    );
}

#[actix_web::test]
async fn polling_a_pending_order_reconciles_against_the_gateway() {
    let _ = env_logger::try_init();
    let backend = TestBackend::with_order(pending_order("9F86D081A2"));
    let gateway = TestGateway { verify_status: Some(GatewayPaymentStatus::Paid) };
    let req = TestRequest::get().uri("/payment/status/9F86D081A2");
    let (status, body) = send_public(req, webhook_routes(backend.clone(), gateway)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "Processing");
    assert_eq!(backend.recorded_reconciliations(), vec![GatewayPaymentStatus::Paid]);
}

#[actix_web::test]
async fn polling_an_unknown_code_is_a_404() {
    let _ = env_logger::try_init();
    let backend = TestBackend::default();
    let req = TestRequest::get().uri("/payment/status/NOPE");
    let (status, _) = send_public(req, webhook_routes(backend, TestGateway::default())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
