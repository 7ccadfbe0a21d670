//! A thin client for the PayOS merchant API.
//!
//! The client covers the two calls the payment workflow needs: registering a payable amount to obtain a hosted
//! checkout link, and fetching the live status of an existing payment request. Request signing, order-code
//! normalisation and the gateway's rather loose response schemas are all handled here so that callers only ever see
//! clean values.
mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::PayOsApi;
pub use config::PayOsConfig;
pub use data_objects::{probe_string_field, PayOsEnvelope, PaymentLinkData, STATUS_FIELDS};
pub use error::PayOsApiError;
