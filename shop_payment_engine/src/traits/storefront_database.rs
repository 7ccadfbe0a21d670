use thiserror::Error;

use crate::{
    db_types::{Order, OrderCode},
    traits::{CartManagement, GatewayError, GatewayPaymentStatus, OrderManagement, PaymentGateway},
};

/// The highest level of behaviour for backends supporting the shop payment engine:
/// * cart and order storage (via the supertraits), and
/// * the two flows with transactional or idempotency requirements: checkout and payment reconciliation.
#[allow(async_fn_in_trait)]
pub trait StorefrontDatabase: Clone + CartManagement + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Converts the user's cart into a durable order with a payment link, atomically.
    ///
    /// The sequence is: load the cart lines, fail with [`StorefrontError::EmptyCart`] if there are none, then in a
    /// single transaction insert the pending order and its items, obtain a payment link from `gateway` under a fresh
    /// order code, attach the link and transaction id, and delete exactly the cart lines that were loaded, so that
    /// lines added concurrently during checkout survive. Any failure after the insert rolls the whole transaction back and
    /// surfaces [`StorefrontError::PlacementFailed`] wrapping the cause.
    ///
    /// Returns the committed order, re-read from the database.
    async fn place_order(
        &self,
        user_id: i64,
        gateway: &impl PaymentGateway,
    ) -> Result<Order, StorefrontError>;

    /// Applies a normalized gateway status to the order with the given code.
    ///
    /// The writes are unconditional and therefore idempotent: a repeated `Paid` or `Cancelled` report leaves the
    /// order in the same final state. `Pending` and unrecognized statuses leave the order untouched.
    ///
    /// Returns the order as stored after the update.
    async fn reconcile_payment_status(
        &self,
        order_code: &OrderCode,
        status: &GatewayPaymentStatus,
    ) -> Result<Order, StorefrontError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StorefrontError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum StorefrontError {
    #[error("We have an internal database error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested product {0} does not exist")]
    ProductNotFound(i64),
    #[error("No cart exists for user {0}")]
    CartNotFound(i64),
    #[error("User {user_id}'s cart has no line for product {product_id}")]
    CartItemNotFound { user_id: i64, product_id: i64 },
    #[error("Quantity must be a positive integer, not {0}")]
    InvalidQuantity(i64),
    #[error("Cannot place an order from an empty cart")]
    EmptyCart,
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderCode),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
    #[error("{0}")]
    PaymentGateway(#[from] GatewayError),
    #[error("Could not place the order. {0}")]
    PlacementFailed(String),
}

impl From<sqlx::Error> for StorefrontError {
    fn from(e: sqlx::Error) -> Self {
        StorefrontError::DatabaseError(e.to_string())
    }
}
