use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
    HttpResponse,
};
use chrono::Duration;
use shop_payment_engine::db_types::Roles;
use spg_common::Secret;

use crate::{auth::TokenIssuer, config::AuthConfig, middleware::JwtMiddlewareFactory};

// A test-only signing secret. DO NOT re-use it anywhere.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("endpoint-test-secret-0123456789abcdef".to_string()) }
}

pub fn issue_token(user_id: i64, roles: Roles) -> String {
    let issuer = TokenIssuer::new(&test_auth_config());
    issuer.issue_token(user_id, roles, Duration::hours(1)).expect("Failed to sign token")
}

/// Sends a request through an app wrapped in the JWT middleware, the way the authenticated scopes are served in
/// production. An empty `token` sends no Authorization header at all.
pub async fn send<F>(mut req: TestRequest, token: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    let app = App::new().wrap(JwtMiddlewareFactory::new(test_auth_config())).configure(configure);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            response_parts(res)
        },
        Err(e) => response_parts(e.error_response()),
    }
}

/// Sends a request through an app with no authentication middleware, the way the webhook and polling endpoints are
/// served in production.
pub async fn send_public<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            response_parts(res)
        },
        Err(e) => response_parts(e.error_response()),
    }
}

fn response_parts<B: MessageBody>(res: HttpResponse<B>) -> (StatusCode, String) {
    let status = res.status();
    let bytes = res.into_body().try_into_bytes().unwrap_or_else(|_| panic!("response body was streamed"));
    (status, String::from_utf8_lossy(&bytes).into_owned())
}
