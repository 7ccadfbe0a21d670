use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use shop_payment_engine::{
    db_types::{CartLine, Role, Vnd},
    traits::StorefrontError,
    CartApi,
};

use super::{
    helpers::{issue_token, send},
    mocks::MockCartStore,
};
use crate::routes::{AddCartItemRoute, CartContentsRoute, RemoveCartItemRoute, UpdateCartItemRoute};

fn widget_line() -> CartLine {
    CartLine { id: 1, product_id: 10, product_name: "Widget".to_string(), quantity: 2, unit_price: Vnd::from(1000) }
}

fn cart_routes(mock: MockCartStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/cart")
                .service(AddCartItemRoute::<MockCartStore>::new())
                .service(UpdateCartItemRoute::<MockCartStore>::new())
                .service(RemoveCartItemRoute::<MockCartStore>::new())
                .service(CartContentsRoute::<MockCartStore>::new()),
        )
        .app_data(web::Data::new(CartApi::new(mock)));
    }
}

#[actix_web::test]
async fn the_cart_requires_authentication() {
    let _ = env_logger::try_init();
    let (status, body) = send(TestRequest::get().uri("/cart"), "", cart_routes(MockCartStore::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Auth token not provided"), "unexpected body: {body}");
}

#[actix_web::test]
async fn adding_to_the_cart_returns_the_resulting_line() {
    let _ = env_logger::try_init();
    let mut mock = MockCartStore::new();
    mock.expect_add_cart_item().returning(|_, _, _| Ok(widget_line()));
    let token = issue_token(42, vec![Role::User]);
    let req = TestRequest::post().uri("/cart/add").set_json(serde_json::json!({"productId": 10, "quantity": 2}));
    let (status, body) = send(req, &token, cart_routes(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"id":1,"productId":10,"productName":"Widget","quantity":2,"price":1000}"#);
}

#[actix_web::test]
async fn adding_an_unknown_product_is_a_404() {
    let _ = env_logger::try_init();
    let mut mock = MockCartStore::new();
    mock.expect_add_cart_item().returning(|_, _, _| Err(StorefrontError::ProductNotFound(99)));
    let token = issue_token(42, vec![Role::User]);
    let req = TestRequest::post().uri("/cart/add").set_json(serde_json::json!({"productId": 99, "quantity": 1}));
    let (status, body) = send(req, &token, cart_routes(mock)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("product 99 does not exist"), "unexpected body: {body}");
}

#[actix_web::test]
async fn an_absent_cart_lists_as_an_empty_array() {
    let _ = env_logger::try_init();
    let mut mock = MockCartStore::new();
    mock.expect_cart_lines().returning(|_| Ok(Vec::new()));
    let token = issue_token(42, vec![Role::User]);
    let (status, body) = send(TestRequest::get().uri("/cart"), &token, cart_routes(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn updating_a_missing_line_is_a_silent_noop() {
    let _ = env_logger::try_init();
    let mut mock = MockCartStore::new();
    mock.expect_update_cart_quantity().returning(|_, _, _| Ok(None));
    let token = issue_token(42, vec![Role::User]);
    let req = TestRequest::put().uri("/cart/update/10?quantity=5");
    let (status, body) = send(req, &token, cart_routes(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Nothing was updated"), "unexpected body: {body}");
}

#[actix_web::test]
async fn updating_an_existing_line_returns_it() {
    let _ = env_logger::try_init();
    let mut mock = MockCartStore::new();
    mock.expect_update_cart_quantity().returning(|_, _, quantity| {
        Ok(Some(CartLine { quantity, ..widget_line() }))
    });
    let token = issue_token(42, vec![Role::User]);
    let req = TestRequest::put().uri("/cart/update/10?quantity=5");
    let (status, body) = send(req, &token, cart_routes(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"id":1,"productId":10,"productName":"Widget","quantity":5,"price":1000}"#);
}

#[actix_web::test]
async fn removing_a_missing_line_is_a_404_and_changes_nothing() {
    let _ = env_logger::try_init();
    let mut mock = MockCartStore::new();
    mock.expect_remove_cart_item()
        .returning(|user_id, product_id| Err(StorefrontError::CartItemNotFound { user_id, product_id }));
    let token = issue_token(42, vec![Role::User]);
    let (status, body) = send(TestRequest::delete().uri("/cart/remove/10"), &token, cart_routes(mock)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("no line for product 10"), "unexpected body: {body}");
}
