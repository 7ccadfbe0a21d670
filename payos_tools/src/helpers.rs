use blake2::{Blake2b512, Digest};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// PayOS rejects descriptions longer than this.
pub const MAX_DESCRIPTION_LEN: usize = 25;

/// The gateway's `orderCode` field is a positive integer. Numeric order codes pass through unchanged; anything else is
/// mapped onto a stable positive integer by hashing, so that the same system-side code always correlates with the same
/// gateway payment request. The string code remains the lookup key on our side.
pub fn numeric_order_code(order_code: &str) -> i64 {
    if let Ok(n) = order_code.parse::<i64>() {
        if n > 0 {
            return n;
        }
    }
    let digest = Blake2b512::digest(order_code.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    // Clear the sign bit rather than taking abs(), which is undefined for i64::MIN
    (i64::from_be_bytes(bytes) & i64::MAX).max(1)
}

/// Truncates a payment description to the gateway's maximum length, on a character boundary.
pub fn truncate_description(description: &str) -> String {
    if description.is_empty() {
        return "Payment".to_string();
    }
    description.chars().take(MAX_DESCRIPTION_LEN).collect()
}

/// Signs a payment-link request the way PayOS expects: an HMAC-SHA256 over the request fields serialized as
/// `key=value` pairs in alphabetical key order, hex-encoded.
pub fn sign_request(checksum_key: &str, fields: &[(&str, String)]) -> String {
    let mut sorted = fields.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let payload = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<String>>().join("&");
    let mut mac = Hmac::<Sha256>::new_from_slice(checksum_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
