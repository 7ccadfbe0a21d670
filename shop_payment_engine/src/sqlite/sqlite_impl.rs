//! `SqliteDatabase` is a concrete implementation of a shop payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module. Multi-step flows compose the low-level functions in [`super::db`] inside a single pool transaction.
use std::fmt::Debug;

use log::*;
use sqlx::{SqliteConnection, SqlitePool};
use spg_common::Vnd;

use super::db::{carts, new_pool, orders, products};
use crate::{
    db_types::{CartLine, NewOrder, Order, OrderCode, OrderStatus, Product},
    helpers::new_order_code,
    traits::{
        CartManagement,
        GatewayPaymentStatus,
        OrderManagement,
        PaymentGateway,
        PaymentLinkRequest,
        StorefrontDatabase,
        StorefrontError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StorefrontError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding schema migrations.
    pub async fn run_migrations(&self) -> Result<(), StorefrontError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorefrontError::DatabaseError(e.to_string()))?;
        debug!("📝️ Database migrations are up to date");
        Ok(())
    }

    /// Seeds a product row. Catalog management belongs to another service; this is for tooling and tests.
    pub async fn insert_product(&self, name: &str, price: Vnd) -> Result<Product, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(name, price, &mut conn).await?;
        Ok(product)
    }
}

fn check_quantity(quantity: i64) -> Result<(), StorefrontError> {
    if quantity <= 0 {
        return Err(StorefrontError::InvalidQuantity(quantity));
    }
    Ok(())
}

impl CartManagement for SqliteDatabase {
    async fn add_cart_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartLine, StorefrontError> {
        check_quantity(quantity)?;
        let mut tx = self.pool.begin().await?;
        let product = products::fetch_product(product_id, &mut tx)
            .await?
            .ok_or(StorefrontError::ProductNotFound(product_id))?;
        let cart = carts::fetch_or_create_cart(user_id, &mut tx).await?;
        carts::upsert_cart_item(cart.id, product_id, quantity, product.price, &mut tx).await?;
        let line = carts::fetch_cart_line(user_id, product_id, &mut tx)
            .await?
            .ok_or(StorefrontError::CartItemNotFound { user_id, product_id })?;
        tx.commit().await?;
        debug!("🛒️ User {user_id} now has {}x {} in their cart", line.quantity, line.product_name);
        Ok(line)
    }

    async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let lines = carts::fetch_cart_lines(user_id, &mut conn).await?;
        Ok(lines)
    }

    async fn update_cart_quantity(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<Option<CartLine>, StorefrontError> {
        check_quantity(quantity)?;
        let mut tx = self.pool.begin().await?;
        let Some(cart) = carts::fetch_cart(user_id, &mut tx).await? else {
            debug!("🛒️ User {user_id} has no cart to update. Skipping.");
            return Ok(None);
        };
        let product = products::fetch_product(product_id, &mut tx)
            .await?
            .ok_or(StorefrontError::ProductNotFound(product_id))?;
        let updated = carts::set_quantity(cart.id, product_id, quantity, product.price, &mut tx).await?;
        if updated == 0 {
            debug!("🛒️ User {user_id}'s cart has no line for product {product_id}. Skipping.");
            return Ok(None);
        }
        let line = carts::fetch_cart_line(user_id, product_id, &mut tx).await?;
        tx.commit().await?;
        Ok(line)
    }

    async fn remove_cart_item(&self, user_id: i64, product_id: i64) -> Result<(), StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let cart =
            carts::fetch_cart(user_id, &mut conn).await?.ok_or(StorefrontError::CartNotFound(user_id))?;
        let deleted = carts::delete_cart_item(cart.id, product_id, &mut conn).await?;
        if deleted == 0 {
            return Err(StorefrontError::CartItemNotFound { user_id, product_id });
        }
        debug!("🛒️ Removed product {product_id} from user {user_id}'s cart");
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_code(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_code(order_code, &mut conn).await?;
        Ok(order)
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, status, &mut conn).await?;
        if order.is_none() {
            debug!("📝️ Status update for unknown order id {order_id} skipped.");
        }
        Ok(order)
    }

    async fn mark_order_paid(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::mark_paid(order_code, &mut conn).await?;
        Ok(order)
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn place_order(
        &self,
        user_id: i64,
        gateway: &impl PaymentGateway,
    ) -> Result<Order, StorefrontError> {
        let lines = {
            let mut conn = self.pool.acquire().await?;
            carts::fetch_cart_lines(user_id, &mut conn).await?
        };
        if lines.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        let order = NewOrder::from_cart_lines(user_id, &lines);
        debug!(
            "🔄️ Placing order for user {user_id}: {} lines totalling {}",
            lines.len(),
            order.total_amount
        );
        let mut tx = self.pool.begin().await?;
        let order_id = match checkout_in_tx(order, &lines, gateway, &mut tx).await {
            Ok(order_id) => order_id,
            Err(e) => {
                // Dropping the transaction rolls back the order insert; the cart lines stay as they were.
                warn!("🔄️ Order placement for user {user_id} failed and was rolled back. {e}");
                return Err(StorefrontError::PlacementFailed(e.to_string()));
            },
        };
        tx.commit().await?;
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn)
            .await?
            .ok_or(StorefrontError::OrderIdNotFound(order_id))?;
        info!(
            "🔄️ Order #{order_id} [{}] placed for user {user_id}, awaiting payment of {}",
            order.order_code.as_ref().map(OrderCode::as_str).unwrap_or("-"),
            order.total_amount
        );
        Ok(order)
    }

    async fn reconcile_payment_status(
        &self,
        order_code: &OrderCode,
        status: &GatewayPaymentStatus,
    ) -> Result<Order, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_code(order_code, &mut conn)
            .await?
            .ok_or_else(|| StorefrontError::OrderNotFound(order_code.clone()))?;
        match status {
            GatewayPaymentStatus::Paid => {
                orders::mark_paid(order_code, &mut conn).await?;
                orders::update_order_status(order.id, OrderStatus::Processing, &mut conn).await?;
                info!("🔄️ Order [{order_code}] is paid and has moved to Processing");
            },
            GatewayPaymentStatus::Cancelled => {
                orders::update_order_status(order.id, OrderStatus::Cancelled, &mut conn).await?;
                info!("🔄️ Order [{order_code}] has been cancelled");
            },
            GatewayPaymentStatus::Pending => {
                debug!("🔄️ Order [{order_code}] remains {}", order.status);
            },
            GatewayPaymentStatus::Unrecognized(s) => {
                warn!("🔄️ Unexpected payment status '{s}' for order [{order_code}]. Leaving the order as-is.");
            },
        }
        orders::fetch_order_by_code(order_code, &mut conn)
            .await?
            .ok_or_else(|| StorefrontError::OrderNotFound(order_code.clone()))
    }
}

/// The body of the placement transaction: insert the pending order and its items, obtain a payment link under a
/// fresh order code, attach the gateway correlation data, and delete exactly the cart lines that were loaded before
/// the transaction began. Runs against `&mut *tx` so that a failure anywhere unwinds the lot.
async fn checkout_in_tx(
    order: NewOrder,
    lines: &[CartLine],
    gateway: &impl PaymentGateway,
    tx: &mut SqliteConnection,
) -> Result<i64, StorefrontError> {
    let order = orders::insert_order(order, tx).await?;
    let order_code = new_order_code();
    let request = PaymentLinkRequest {
        order_code: order_code.clone(),
        amount: order.total_amount,
        description: format!("Order #{order_code}"),
    };
    let link = gateway.create_payment_link(request).await?;
    orders::attach_payment_info(order.id, &order_code, &link.transaction_id, &link.checkout_url, tx).await?;
    let line_ids = lines.iter().map(|line| line.id).collect::<Vec<i64>>();
    let cleared = carts::delete_cart_lines(&line_ids, tx).await?;
    trace!("🔄️ {cleared} cart lines cleared for order [{order_code}]");
    Ok(order.id)
}
