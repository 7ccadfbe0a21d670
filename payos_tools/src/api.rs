use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::PayOsConfig,
    data_objects::{PayOsEnvelope, PaymentLinkData, CHECKOUT_URL_FIELDS, STATUS_FIELDS, TRANSACTION_ID_FIELDS},
    helpers::{numeric_order_code, sign_request, truncate_description},
    probe_string_field,
    PayOsApiError,
};

#[derive(Clone)]
pub struct PayOsApi {
    config: PayOsConfig,
    client: Arc<Client>,
}

impl PayOsApi {
    pub fn new(config: PayOsConfig) -> Result<Self, PayOsApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let client_id = HeaderValue::from_str(config.client_id.as_str())
            .map_err(|e| PayOsApiError::Initialization(e.to_string()))?;
        let api_key = HeaderValue::from_str(config.api_key.reveal().as_str())
            .map_err(|e| PayOsApiError::Initialization(e.to_string()))?;
        headers.insert("x-client-id", client_id);
        headers.insert("x-api-key", api_key);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PayOsApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PayOsApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PayOsApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| PayOsApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PayOsApiError::RestResponseError(e.to_string()))?;
            Err(PayOsApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Registers a payable amount with the gateway and returns the hosted checkout URL and the gateway's transaction
    /// identifier.
    ///
    /// The description is truncated to the gateway's 25-character limit and the amount is a whole number of đồng.
    /// The request signature is computed over the signable fields; header authentication is set up at construction.
    pub async fn create_payment_link(
        &self,
        order_code: &str,
        amount: i64,
        description: &str,
    ) -> Result<PaymentLinkData, PayOsApiError> {
        let code = numeric_order_code(order_code);
        if code != order_code.parse::<i64>().unwrap_or(0) {
            warn!("💳️ Order code {order_code} is not numeric. Correlating with the gateway as {code}.");
        }
        let description = truncate_description(description);
        let signature = sign_request(self.config.checksum_key.reveal(), &[
            ("amount", amount.to_string()),
            ("cancelUrl", self.config.cancel_url.clone()),
            ("description", description.clone()),
            ("orderCode", code.to_string()),
            ("returnUrl", self.config.return_url.clone()),
        ]);
        let body = serde_json::json!({
            "orderCode": code,
            "amount": amount,
            "description": description,
            "returnUrl": self.config.return_url,
            "cancelUrl": self.config.cancel_url,
            "signature": signature,
        });
        debug!("💳️ Creating payment link for order {order_code} ({amount} VND)");
        let envelope =
            self.rest_query::<PayOsEnvelope, Value>(Method::POST, "/v2/payment-requests", Some(body)).await?;
        if !envelope.is_success() {
            return Err(PayOsApiError::GatewayRejection { code: envelope.code, desc: envelope.desc });
        }
        let data = envelope.data.unwrap_or(Value::Null);
        let checkout_url = probe_string_field(&data, &CHECKOUT_URL_FIELDS)
            .ok_or_else(|| PayOsApiError::MissingResponseData("checkoutUrl".to_string()))?;
        let transaction_id = probe_string_field(&data, &TRANSACTION_ID_FIELDS).unwrap_or_default();
        info!("💳️ Payment link created for order {order_code}");
        Ok(PaymentLinkData { checkout_url, transaction_id })
    }

    /// Fetches the live status of a previously registered payment request.
    ///
    /// Returns `None` when the gateway responds successfully but no status field can be found in the response. The
    /// response schema varies between endpoint versions, so the field is probed rather than deserialized strictly.
    pub async fn payment_link_status(&self, order_code: &str) -> Result<Option<String>, PayOsApiError> {
        let code = numeric_order_code(order_code);
        let path = format!("/v2/payment-requests/{code}");
        debug!("💳️ Verifying payment status for order {order_code}");
        let envelope = self.rest_query::<PayOsEnvelope, ()>(Method::GET, &path, None).await?;
        if !envelope.is_success() {
            return Err(PayOsApiError::GatewayRejection { code: envelope.code, desc: envelope.desc });
        }
        let data = envelope.data.unwrap_or(Value::Null);
        let status = probe_string_field(&data, &STATUS_FIELDS);
        if status.is_none() {
            warn!("💳️ Could not extract a payment status for order {order_code} from the gateway response");
        }
        Ok(status)
    }
}
