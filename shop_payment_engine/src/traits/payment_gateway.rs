use std::fmt::Display;

use thiserror::Error;

use crate::db_types::{OrderCode, Vnd};

/// What the workflow hands the gateway when registering a payable amount.
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub order_code: OrderCode,
    /// Whole đồng. The client passes this through to the gateway unscaled.
    pub amount: Vnd,
    /// Free-text description. The client truncates this to the gateway's limit.
    pub description: String,
}

/// What the gateway hands back: a hosted checkout URL and its own transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub checkout_url: String,
    pub transaction_id: String,
}

/// The gateway's view of a payment, normalized from the many strings the gateway uses on the wire. This is the only
/// form in which gateway statuses reach the order workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayPaymentStatus {
    Paid,
    Cancelled,
    Pending,
    /// A status string this engine does not know. Reconciliation logs it and leaves the order untouched.
    Unrecognized(String),
}

impl GatewayPaymentStatus {
    /// Case-insensitive mapping from the gateway's wire statuses.
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "PAID" | "PAID_SUCCESS" => Self::Paid,
            "CANCELLED" | "CANCELLED_BY_USER" | "EXPIRED" => Self::Cancelled,
            "PENDING" | "WAITING_FOR_PAYMENT" => Self::Pending,
            _ => Self::Unrecognized(status.to_string()),
        }
    }
}

impl Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paid => write!(f, "Paid"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Pending => write!(f, "Pending"),
            Self::Unrecognized(s) => write!(f, "Unrecognized({s})"),
        }
    }
}

/// The payment gateway as the order workflow sees it. Authentication, request signing and response decoding are
/// implementation details of the client behind this trait.
///
/// Implementations must put a bound on how long a call can take; the placement transaction holds a database
/// transaction open across [`PaymentGateway::create_payment_link`].
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Registers the order's total with the gateway and returns a hosted checkout link.
    async fn create_payment_link(&self, request: PaymentLinkRequest) -> Result<PaymentLink, GatewayError>;

    /// Fetches the live status of a previously created payment. `Ok(None)` means the gateway responded but carried no
    /// recognizable status field; the caller treats that as "no new information".
    async fn verify_payment(&self, order_code: &OrderCode)
        -> Result<Option<GatewayPaymentStatus>, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not reach the payment gateway. {0}")]
    Transport(String),
    #[error("The payment gateway rejected the request. {0}")]
    Rejected(String),
    #[error("Unexpected response from the payment gateway. {0}")]
    UnexpectedResponse(String),
}
