use std::fmt::Debug;

use crate::{
    db_types::{Order, OrderCode},
    traits::{OrderManagement, StorefrontError},
};

/// Read-only access to order records. Status-changing calls live on [`crate::OrderFlowApi`].
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    /// All orders for the user, items resolved, most recent first.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorefrontError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, StorefrontError> {
        self.db.fetch_order_by_id(order_id).await
    }

    pub async fn order_by_code(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError> {
        self.db.fetch_order_by_code(order_code).await
    }
}
