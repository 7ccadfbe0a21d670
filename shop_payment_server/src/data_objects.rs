use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityParam {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// The webhook body the gateway posts. Everything except the order code is optional in practice; the order code is
/// the one field reconciliation cannot work without.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallbackRequest {
    #[serde(default)]
    pub order_code: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The envelope the gateway expects back from a webhook delivery. Code `0` is success; business failures are
/// reported with `-1` inside an HTTP 200 so the gateway does not retry-storm us.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

impl WebhookAck {
    pub fn success<S: Display>(message: S) -> Self {
        Self { code: 0, message: message.to_string(), data: None }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { code: -1, message: message.to_string(), data: None }
    }
}

/// `{message, data}` envelope used by the order endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> MessageResponse<T> {
    pub fn new<S: Display>(message: S, data: T) -> Self {
        Self { message: message.to_string(), data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub order_code: String,
    pub status: String,
    pub payment_url: Option<String>,
}
