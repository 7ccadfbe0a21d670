use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use shop_payment_engine::{CartApi, OrderFlowApi, OrderQueryApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::payos::PayOsGateway,
    middleware::JwtMiddlewareFactory,
    routes::{
        health,
        AddCartItemRoute,
        CartContentsRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        OrderWebhookRoute,
        PaymentStatusRoute,
        PaymentWebhookRoute,
        PlaceOrderRoute,
        RemoveCartItemRoute,
        UpdateCartItemRoute,
        UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway =
        PayOsGateway::new(config.payos.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: PayOsGateway,
) -> Result<Server, ServerError> {
    let auth = config.auth.clone();
    let srv = HttpServer::new(move || {
        let cart_api = CartApi::new(db.clone());
        let order_flow_api = OrderFlowApi::new(db.clone(), gateway.clone());
        let order_query_api = OrderQueryApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spg::access_log"))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(order_query_api));
        // Routes that require authentication
        let cart_scope = web::scope("/cart")
            .wrap(JwtMiddlewareFactory::new(auth.clone()))
            .service(AddCartItemRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(CartContentsRoute::<SqliteDatabase>::new());
        // `my-orders` must be registered ahead of the `{order_id}` pattern, which would otherwise swallow it.
        let order_scope = web::scope("/order")
            .wrap(JwtMiddlewareFactory::new(auth.clone()))
            .service(PlaceOrderRoute::<SqliteDatabase, PayOsGateway>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase, PayOsGateway>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new());
        // The gateway calls the webhooks without credentials, so they live outside the authenticated scopes and are
        // registered ahead of the /order scope, which shares their path prefix.
        app.service(health)
            .service(OrderWebhookRoute::<SqliteDatabase, PayOsGateway>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase, PayOsGateway>::new())
            .service(PaymentStatusRoute::<SqliteDatabase, PayOsGateway>::new())
            .service(cart_scope)
            .service(order_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
