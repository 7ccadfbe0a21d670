use serde::Deserialize;
use serde_json::Value;

/// The standard PayOS response envelope. `code` is `"00"` on success; anything else is a rejection and `desc` carries
/// the gateway's own explanation.
#[derive(Debug, Clone, Deserialize)]
pub struct PayOsEnvelope {
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl PayOsEnvelope {
    pub fn is_success(&self) -> bool {
        self.code == "00"
    }
}

/// The fields we need back from a successful payment-link registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLinkData {
    pub checkout_url: String,
    pub transaction_id: String,
}

/// Field names under which the gateway has been observed to report a payment status. The response schema varies with
/// the endpoint version, so the status is probed rather than deserialized into a fixed struct.
pub const STATUS_FIELDS: [&str; 4] = ["status", "Status", "state", "State"];

pub(crate) const CHECKOUT_URL_FIELDS: [&str; 2] = ["checkoutUrl", "CheckoutUrl"];
pub(crate) const TRANSACTION_ID_FIELDS: [&str; 3] = ["paymentLinkId", "transactionId", "TransactionId"];

/// Best-effort probe for a string field that may appear under several names, either at the top level of `value` or
/// nested under a `data` object. Returns the first non-empty match.
pub fn probe_string_field(value: &Value, names: &[&str]) -> Option<String> {
    let candidates = [value, &value["data"]];
    for candidate in candidates {
        for name in names {
            if let Some(s) = candidate[name].as_str() {
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
        }
    }
    None
}
