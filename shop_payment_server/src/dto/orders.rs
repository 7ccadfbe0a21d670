use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_payment_engine::db_types::{Order, OrderItem};

/// The client-facing view of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i64,
    pub user_id: i64,
    /// Whole đồng.
    pub total_amount: i64,
    pub status: String,
    pub order_code: Option<String>,
    pub payment_url: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in whole đồng, as snapshotted at checkout.
    pub price: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self { product_id: item.product_id, quantity: item.quantity, price: item.unit_price.value() }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            total_amount: order.total_amount.value(),
            status: order.status.to_string(),
            order_code: order.order_code.map(|c| c.0),
            payment_url: order.payment_link,
            transaction_id: order.transaction_id,
            created_at: order.created_at,
            paid_at: order.paid_at,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}
