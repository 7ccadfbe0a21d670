use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use mockall::mock;
use shop_payment_engine::{
    db_types::{CartLine, Order, OrderCode, OrderItem, OrderStatus, Vnd},
    traits::{
        CartManagement,
        GatewayError,
        GatewayPaymentStatus,
        OrderManagement,
        PaymentGateway,
        PaymentLink,
        PaymentLinkRequest,
        StorefrontDatabase,
        StorefrontError,
    },
};

mock! {
    pub CartStore {}
    impl CartManagement for CartStore {
        async fn add_cart_item(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartLine, StorefrontError>;
        async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>, StorefrontError>;
        async fn update_cart_quantity(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<Option<CartLine>, StorefrontError>;
        async fn remove_cart_item(&self, user_id: i64, product_id: i64) -> Result<(), StorefrontError>;
    }
}

mock! {
    pub OrderStore {}
    impl OrderManagement for OrderStore {
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorefrontError>;
        async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, StorefrontError>;
        async fn fetch_order_by_code(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError>;
        async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Option<Order>, StorefrontError>;
        async fn mark_order_paid(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError>;
    }
}

/// A canned backend for driving the checkout and webhook endpoints. Mockall cannot express
/// [`StorefrontDatabase::place_order`]'s `&impl PaymentGateway` argument, so this double is written by hand. It holds
/// a single order and records every reconciliation applied to it.
#[derive(Clone, Default)]
pub struct TestBackend {
    pub order: Option<Order>,
    pub placement_error: Option<StorefrontError>,
    pub reconciliations: Arc<Mutex<Vec<GatewayPaymentStatus>>>,
}

impl TestBackend {
    pub fn with_order(order: Order) -> Self {
        Self { order: Some(order), ..Default::default() }
    }

    pub fn failing_with(error: StorefrontError) -> Self {
        Self { placement_error: Some(error), ..Default::default() }
    }

    pub fn recorded_reconciliations(&self) -> Vec<GatewayPaymentStatus> {
        self.reconciliations.lock().unwrap().clone()
    }

    fn order_for_code(&self, order_code: &OrderCode) -> Option<Order> {
        self.order.clone().filter(|o| o.order_code.as_ref() == Some(order_code))
    }
}

impl CartManagement for TestBackend {
    async fn add_cart_item(&self, _: i64, _: i64, _: i64) -> Result<CartLine, StorefrontError> {
        Err(StorefrontError::DatabaseError("TestBackend does not serve cart operations".to_string()))
    }

    async fn cart_lines(&self, _: i64) -> Result<Vec<CartLine>, StorefrontError> {
        Ok(Vec::new())
    }

    async fn update_cart_quantity(&self, _: i64, _: i64, _: i64) -> Result<Option<CartLine>, StorefrontError> {
        Ok(None)
    }

    async fn remove_cart_item(&self, _: i64, _: i64) -> Result<(), StorefrontError> {
        Err(StorefrontError::DatabaseError("TestBackend does not serve cart operations".to_string()))
    }
}

impl OrderManagement for TestBackend {
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorefrontError> {
        Ok(self.order.clone().filter(|o| o.user_id == user_id).into_iter().collect())
    }

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, StorefrontError> {
        Ok(self.order.clone().filter(|o| o.id == order_id))
    }

    async fn fetch_order_by_code(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError> {
        Ok(self.order_for_code(order_code))
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorefrontError> {
        Ok(self.order.clone().filter(|o| o.id == order_id).map(|mut o| {
            o.status = status;
            o
        }))
    }

    async fn mark_order_paid(&self, order_code: &OrderCode) -> Result<Option<Order>, StorefrontError> {
        Ok(self.order_for_code(order_code).map(|mut o| {
            o.paid_at = Some(Utc::now());
            o
        }))
    }
}

impl StorefrontDatabase for TestBackend {
    fn url(&self) -> &str {
        "sqlite://test-backend"
    }

    async fn place_order(&self, _: i64, _: &impl PaymentGateway) -> Result<Order, StorefrontError> {
        if let Some(e) = &self.placement_error {
            return Err(e.clone());
        }
        self.order.clone().ok_or_else(|| StorefrontError::DatabaseError("No canned order".to_string()))
    }

    async fn reconcile_payment_status(
        &self,
        order_code: &OrderCode,
        status: &GatewayPaymentStatus,
    ) -> Result<Order, StorefrontError> {
        let mut order =
            self.order_for_code(order_code).ok_or_else(|| StorefrontError::OrderNotFound(order_code.clone()))?;
        self.reconciliations.lock().unwrap().push(status.clone());
        match status {
            GatewayPaymentStatus::Paid => {
                order.status = OrderStatus::Processing;
                order.paid_at = Some(Utc::now());
            },
            GatewayPaymentStatus::Cancelled => order.status = OrderStatus::Cancelled,
            GatewayPaymentStatus::Pending | GatewayPaymentStatus::Unrecognized(_) => {},
        }
        Ok(order)
    }
}

/// A well-behaved gateway double for the flow routes. `verify_status` is what `verify_payment` reports back.
#[derive(Clone, Default)]
pub struct TestGateway {
    pub verify_status: Option<GatewayPaymentStatus>,
}

impl PaymentGateway for TestGateway {
    async fn create_payment_link(&self, request: PaymentLinkRequest) -> Result<PaymentLink, GatewayError> {
        Ok(PaymentLink {
            checkout_url: format!("https://pay.example.com/{}", request.order_code),
            transaction_id: format!("txn-{}", request.order_code),
        })
    }

    async fn verify_payment(
        &self,
        _order_code: &OrderCode,
    ) -> Result<Option<GatewayPaymentStatus>, GatewayError> {
        Ok(self.verify_status.clone())
    }
}

/// A pending order for user 42 with two lines totalling 2500₫, as it would look just after placement.
pub fn pending_order(code: &str) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Order {
        id: 1,
        user_id: 42,
        total_amount: Vnd::from(2500),
        status: OrderStatus::Pending,
        order_code: Some(OrderCode(code.to_string())),
        payment_link: Some(format!("https://pay.example.com/{code}")),
        transaction_id: Some(format!("txn-{code}")),
        paid_at: None,
        created_at,
        updated_at: created_at,
        items: vec![
            OrderItem { id: 1, order_id: 1, product_id: 10, quantity: 2, unit_price: Vnd::from(1000) },
            OrderItem { id: 2, order_id: 1, product_id: 11, quantity: 1, unit_price: Vnd::from(500) },
        ],
    }
}
