use crate::{
    db_types::{Order, OrderCode, OrderStatus},
    traits::StorefrontError,
};

/// Durable order records. All fetches resolve order items eagerly.
///
/// Point lookups return `None` rather than an error when the order is absent; callers decide whether absence matters.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// All orders for the user, most recent first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorefrontError>;

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, StorefrontError>;

    async fn fetch_order_by_code(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError>;

    /// Unconditionally overwrites the order status. A missing order is a no-op and returns `None`.
    async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorefrontError>;

    /// Records the payment timestamp for the order with the given code. The timestamp is only written once; repeated
    /// calls leave the original value in place. A missing order is a no-op and returns `None`.
    async fn mark_order_paid(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError>;
}
