//! Adapts the PayOS REST client to the engine's [`PaymentGateway`] trait.
//!
//! The engine never sees the wire-level client; it hands this adapter a [`PaymentLinkRequest`] and gets back a
//! normalized [`PaymentLink`] or [`GatewayPaymentStatus`]. Signing, header authentication, description truncation
//! and the numeric order-code derivation all stay inside `payos_tools`.

use payos_tools::{PayOsApi, PayOsApiError, PayOsConfig};
use shop_payment_engine::{
    db_types::OrderCode,
    traits::{GatewayError, GatewayPaymentStatus, PaymentGateway, PaymentLink, PaymentLinkRequest},
};

#[derive(Clone)]
pub struct PayOsGateway {
    api: PayOsApi,
}

impl PayOsGateway {
    pub fn new(config: PayOsConfig) -> Result<Self, PayOsApiError> {
        let api = PayOsApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for PayOsGateway {
    async fn create_payment_link(&self, request: PaymentLinkRequest) -> Result<PaymentLink, GatewayError> {
        let data = self
            .api
            .create_payment_link(request.order_code.as_str(), request.amount.value(), &request.description)
            .await
            .map_err(into_gateway_error)?;
        Ok(PaymentLink { checkout_url: data.checkout_url, transaction_id: data.transaction_id })
    }

    async fn verify_payment(
        &self,
        order_code: &OrderCode,
    ) -> Result<Option<GatewayPaymentStatus>, GatewayError> {
        let status = self.api.payment_link_status(order_code.as_str()).await.map_err(into_gateway_error)?;
        Ok(status.map(|s| GatewayPaymentStatus::parse(&s)))
    }
}

fn into_gateway_error(e: PayOsApiError) -> GatewayError {
    match e {
        PayOsApiError::Initialization(m) | PayOsApiError::RestResponseError(m) => GatewayError::Transport(m),
        PayOsApiError::QueryError { .. } | PayOsApiError::GatewayRejection { .. } => {
            GatewayError::Rejected(e.to_string())
        },
        PayOsApiError::JsonError(m) | PayOsApiError::MissingResponseData(m) => {
            GatewayError::UnexpectedResponse(m)
        },
    }
}
