use std::time::Duration;

use log::*;
use spg_common::Secret;

const DEFAULT_PAYOS_BASE_URL: &str = "https://api-merchant.payos.vn";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct PayOsConfig {
    pub client_id: String,
    pub api_key: Secret<String>,
    pub checksum_key: Secret<String>,
    pub base_url: String,
    /// Where the gateway sends the customer after completing payment.
    pub return_url: String,
    /// Where the gateway sends the customer after abandoning payment.
    pub cancel_url: String,
    /// Upper bound on any single request to the gateway. The gateway is untrusted and may hang; a placement
    /// transaction must never be held open indefinitely waiting for it.
    pub timeout: Duration,
}

impl Default for PayOsConfig {
    fn default() -> Self {
        Self {
            client_id: String::default(),
            api_key: Secret::default(),
            checksum_key: Secret::default(),
            base_url: DEFAULT_PAYOS_BASE_URL.to_string(),
            return_url: format!("{DEFAULT_FRONTEND_URL}/payment-success"),
            cancel_url: format!("{DEFAULT_FRONTEND_URL}/payment-cancel"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PayOsConfig {
    pub fn from_env_or_default() -> Self {
        let client_id = std::env::var("PAYOS_CLIENT_ID").unwrap_or_else(|_| {
            warn!("🪛️ PAYOS_CLIENT_ID is not set. Payment link creation will be rejected by the gateway.");
            String::default()
        });
        let api_key = Secret::new(std::env::var("PAYOS_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ PAYOS_API_KEY is not set. Payment link creation will be rejected by the gateway.");
            String::default()
        }));
        let checksum_key = Secret::new(std::env::var("PAYOS_CHECKSUM_KEY").unwrap_or_else(|_| {
            warn!("🪛️ PAYOS_CHECKSUM_KEY is not set. Request signatures will not verify.");
            String::default()
        }));
        let base_url =
            std::env::var("PAYOS_BASE_URL").unwrap_or_else(|_| DEFAULT_PAYOS_BASE_URL.to_string());
        let frontend_url = std::env::var("SPG_FRONTEND_URL").unwrap_or_else(|_| {
            info!("🪛️ SPG_FRONTEND_URL is not set. Using the default, {DEFAULT_FRONTEND_URL}.");
            DEFAULT_FRONTEND_URL.to_string()
        });
        let frontend_url = frontend_url.trim_end_matches('/').to_string();
        let timeout = std::env::var("PAYOS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self {
            client_id,
            api_key,
            checksum_key,
            base_url,
            return_url: format!("{frontend_url}/payment-success"),
            cancel_url: format!("{frontend_url}/payment-cancel"),
            timeout,
        }
    }
}
