//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, every store and gateway interaction in these
//! handlers is awaited; nothing here may block the worker thread.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use shop_payment_engine::{
    db_types::{OrderCode, OrderStatus, Role},
    traits::{CartManagement, OrderManagement, PaymentGateway, StorefrontDatabase, StorefrontError},
    CartApi,
    OrderFlowApi,
    OrderQueryApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{
        CartRequest,
        JsonResponse,
        MessageResponse,
        PaymentCallbackRequest,
        PaymentStatusResponse,
        QuantityParam,
        UpdateStatusRequest,
        WebhookAck,
    },
    dto::{CartLineResponse, OrderResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:tt),+ requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------

route!(add_cart_item => Post "/add" impl CartManagement);
/// Adds a quantity of a product to the authenticated user's cart, creating the cart on first use. Adding a product
/// that is already in the cart merges into the existing line. Responds with the resulting cart line.
pub async fn add_cart_item<B: CartManagement>(
    claims: JwtClaims,
    body: web::Json<CartRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CartRequest { product_id, quantity } = body.into_inner();
    debug!("💻️ POST cart/add: user {} wants {quantity}x product {product_id}", claims.user_id());
    let line = api.add_item(claims.user_id(), product_id, quantity).await?;
    Ok(HttpResponse::Ok().json(CartLineResponse::from(line)))
}

route!(cart_contents => Get "" impl CartManagement);
/// The authenticated user's cart lines with product names resolved. A user who has never added anything gets an
/// empty array, not a 404.
pub async fn cart_contents<B: CartManagement>(
    claims: JwtClaims,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET cart for user {}", claims.user_id());
    let lines = api.items(claims.user_id()).await?;
    let lines = lines.into_iter().map(CartLineResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(lines))
}

route!(update_cart_item => Put "/update/{product_id}" impl CartManagement);
/// Overwrites the quantity on an existing cart line. A missing cart or line is a silent no-op; the response still
/// carries 200 so that stale clients do not error out.
pub async fn update_cart_item<B: CartManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    query: web::Query<QuantityParam>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    let quantity = query.into_inner().quantity;
    debug!("💻️ PUT cart/update: user {} sets product {product_id} to {quantity}", claims.user_id());
    match api.set_quantity(claims.user_id(), product_id, quantity).await? {
        Some(line) => Ok(HttpResponse::Ok().json(CartLineResponse::from(line))),
        None => Ok(HttpResponse::Ok().json(JsonResponse::success("No matching cart line. Nothing was updated."))),
    }
}

route!(remove_cart_item => Delete "/remove/{product_id}" impl CartManagement);
/// Removes a product's line from the cart. Responds 404 when the cart or line does not exist.
pub async fn remove_cart_item<B: CartManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ DELETE cart/remove: user {} removes product {product_id}", claims.user_id());
    api.remove_item(claims.user_id(), product_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Item removed from cart")))
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(place_order => Post "/place" impl StorefrontDatabase, PaymentGateway);
/// Converts the user's cart into a pending order and returns it together with the hosted payment link. The whole
/// placement is atomic; on any failure the cart is left exactly as it was and an error is returned instead.
pub async fn place_order<B, G>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    info!("💻️ POST order/place for user {}", claims.user_id());
    let order = api.place_order(claims.user_id()).await?;
    let response =
        MessageResponse::new("Order placed. Complete payment at the payment link.", OrderResponse::from(order));
    Ok(HttpResponse::Ok().json(response))
}

route!(my_orders => Get "/my-orders" impl OrderManagement);
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET order/my-orders for user {}", claims.user_id());
    let orders = api.orders_for_user(claims.user_id()).await?;
    let orders = orders.into_iter().map(OrderResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(MessageResponse::new("Orders retrieved", orders)))
}

route!(order_by_id => Get "/{order_id}" impl OrderManagement);
/// A single order by its internal id. Users may only see their own orders; admins may see anyone's. An order
/// belonging to someone else is reported as absent rather than forbidden, so ids cannot be probed.
pub async fn order_by_id<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order/{order_id} for user {}", claims.user_id());
    let order = api
        .order_by_id(order_id)
        .await?
        .filter(|order| order.user_id == claims.user_id() || claims.has_role(Role::Admin))
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

route!(update_order_status => Put "/{order_id}/status" impl StorefrontDatabase, PaymentGateway requires [Role::Admin]);
/// Administrative status override. The target status must parse as one of the known statuses, but no transition
/// validation is applied beyond that.
pub async fn update_order_status<B, G>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    let order_id = path.into_inner();
    let status = body
        .into_inner()
        .status
        .parse::<OrderStatus>()
        .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    info!("💻️ PUT order/{order_id}/status to {status}, requested by user {}", claims.user_id());
    let order = api
        .update_order_status(order_id, status)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------

route!(order_webhook => Post "/order/webhook" impl StorefrontDatabase, PaymentGateway);
pub async fn order_webhook<B, G>(
    body: web::Json<PaymentCallbackRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    let ack = process_payment_callback(body.into_inner(), api.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ack))
}

route!(payment_webhook => Post "/payment/webhook" impl StorefrontDatabase, PaymentGateway);
/// The gateway is configured with this endpoint in some deployments and with `/order/webhook` in others; both accept
/// the same payload.
pub async fn payment_webhook<B, G>(
    body: web::Json<PaymentCallbackRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    let ack = process_payment_callback(body.into_inner(), api.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ack))
}

/// The shared webhook body. A notification without an order code is the one case that earns a 400, since the gateway
/// cannot correlate a retry without it either. Every other failure is logged and acknowledged with a failure-shaped
/// body inside a 200, because a non-success response would only provoke a retry storm from the gateway.
async fn process_payment_callback<B, G>(
    notice: PaymentCallbackRequest,
    api: &OrderFlowApi<B, G>,
) -> Result<WebhookAck, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    let code = notice.order_code.trim();
    if code.is_empty() {
        return Err(ServerError::WebhookDataError("The notification carries no order code".to_string()));
    }
    let order_code = OrderCode(code.to_string());
    debug!("💻️ Payment notification for order [{order_code}] with status '{}'", notice.status);
    let status = Some(notice.status.as_str()).map(str::trim).filter(|s| !s.is_empty());
    let ack = match api.handle_payment_callback(&order_code, status).await {
        Ok(order) => {
            info!("💻️ Payment notification for order [{order_code}] processed. Status is now {}", order.status);
            WebhookAck::success(format!("Order {order_code} is {}", order.status))
        },
        Err(e @ StorefrontError::OrderNotFound(_)) => {
            warn!("💻️ Payment notification for an order we know nothing about. {e}");
            WebhookAck::failure(e)
        },
        Err(e) => {
            warn!("💻️ Could not reconcile the payment notification for order [{order_code}]. {e}");
            WebhookAck::failure("Could not process the payment notification")
        },
    };
    Ok(ack)
}

//----------------------------------------------   Payment status  ----------------------------------------------------

route!(payment_status => Get "/payment/status/{order_code}" impl StorefrontDatabase, PaymentGateway);
/// Polling endpoint for clients waiting on a payment. Unauthenticated: the order code is an unguessable capability
/// and the response carries no personal data.
///
/// While the order is still pending this is a reconciliation trigger, not just a read: the gateway is asked for the
/// live status and the order is updated before the response is built, so a client whose webhook was lost still sees
/// the payment land. A gateway failure falls back to the stored state; the client will simply poll again.
pub async fn payment_status<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    let order_code = OrderCode(path.into_inner());
    trace!("💻️ GET payment/status/{order_code}");
    let stored = api
        .db()
        .fetch_order_by_code(&order_code)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_code} does not exist")))?;
    let order = if stored.status == OrderStatus::Pending {
        match api.handle_payment_callback(&order_code, None).await {
            Ok(order) => order,
            Err(e) => {
                warn!("💻️ Could not refresh order [{order_code}] from the gateway. Reporting the stored state. {e}");
                stored
            },
        }
    } else {
        stored
    };
    let response = PaymentStatusResponse {
        order_code: order_code.to_string(),
        status: order.status.to_string(),
        payment_url: order.payment_link,
    };
    Ok(HttpResponse::Ok().json(response))
}
