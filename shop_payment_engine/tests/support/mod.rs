use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use shop_payment_engine::{
    db_types::{OrderCode, Product, Vnd},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{GatewayError, GatewayPaymentStatus, PaymentGateway, PaymentLink, PaymentLinkRequest},
    SqliteDatabase,
};

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating test database")
}

pub async fn seed_catalog(db: &SqliteDatabase) -> (Product, Product) {
    let widget = db.insert_product("Widget", Vnd::from(1000)).await.expect("Error seeding Widget");
    let gizmo = db.insert_product("Gizmo", Vnd::from(500)).await.expect("Error seeding Gizmo");
    (widget, gizmo)
}

/// A well-behaved gateway double. `verify_status` is what `verify_payment` reports; `verify_calls` counts how often
/// the workflow actually asked.
#[derive(Clone, Default)]
pub struct StubGateway {
    pub verify_status: Option<GatewayPaymentStatus>,
    pub verify_calls: Arc<AtomicUsize>,
}

impl StubGateway {
    pub fn reporting(status: GatewayPaymentStatus) -> Self {
        Self { verify_status: Some(status), verify_calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn verify_call_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for StubGateway {
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
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verify_status.clone())
    }
}

/// A gateway that rejects everything, for exercising the rollback path.
#[derive(Clone)]
pub struct FailingGateway;

impl PaymentGateway for FailingGateway {
    async fn create_payment_link(&self, _request: PaymentLinkRequest) -> Result<PaymentLink, GatewayError> {
        Err(GatewayError::Rejected("Duplicate order code".to_string()))
    }

    async fn verify_payment(
        &self,
        _order_code: &OrderCode,
    ) -> Result<Option<GatewayPaymentStatus>, GatewayError> {
        Err(GatewayError::Transport("connection timed out".to_string()))
    }
}
