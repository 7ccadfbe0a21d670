use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderCode, OrderStatus},
    traits::{GatewayPaymentStatus, PaymentGateway, StorefrontDatabase, StorefrontError},
};

/// `OrderFlowApi` is the primary API for the checkout and payment lifecycle: converting a cart into a durable order
/// with a payment link, and reconciling asynchronous payment-status reports from the gateway against order state.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    /// Converts the user's cart into a pending order and returns it, `payment_link` populated with the gateway's
    /// hosted checkout URL.
    ///
    /// Fails with [`StorefrontError::EmptyCart`] when there is nothing to buy, and with
    /// [`StorefrontError::PlacementFailed`] when any step of the placement transaction fails, in which case nothing
    /// was committed and the cart is untouched.
    pub async fn place_order(&self, user_id: i64) -> Result<Order, StorefrontError> {
        self.db.place_order(user_id, &self.gateway).await
    }

    /// Reconciles a payment-status report for the given order code, whether it arrived by webhook or by polling.
    ///
    /// A status supplied inline by the webhook payload is trusted directly; otherwise the gateway is queried. When
    /// the gateway yields no recognizable status the order is deliberately left untouched; the next notification or
    /// poll will try again.
    ///
    /// This call is idempotent: replaying a terminal status leaves the order unchanged.
    pub async fn handle_payment_callback(
        &self,
        order_code: &OrderCode,
        webhook_status: Option<&str>,
    ) -> Result<Order, StorefrontError> {
        let order = self
            .db
            .fetch_order_by_code(order_code)
            .await?
            .ok_or_else(|| StorefrontError::OrderNotFound(order_code.clone()))?;
        let status = match webhook_status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => {
                debug!("🔄️ Using status from webhook payload for order [{order_code}]: {s}");
                GatewayPaymentStatus::parse(s)
            },
            None => {
                debug!("🔄️ No status in webhook payload for order [{order_code}]. Verifying with the gateway.");
                match self.gateway.verify_payment(order_code).await? {
                    Some(status) => status,
                    None => {
                        warn!(
                            "🔄️ The gateway reported no status for order [{order_code}]. Leaving the order \
                             untouched."
                        );
                        return Ok(order);
                    },
                }
            },
        };
        self.db.reconcile_payment_status(order_code, &status).await
    }

    /// Administrative status override. No transition validation is applied; callers are responsible for using only
    /// sensible target statuses.
    pub async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorefrontError> {
        info!("🔄️ Administrative status override: order id {order_id} -> {status}");
        self.db.update_order_status(order_id, status).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
