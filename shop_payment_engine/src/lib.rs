//! Shop Payment Engine
//!
//! The engine holds the order placement and payment reconciliation workflow for the storefront. It is split into two
//! main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the database directly;
//!    instead, use the public API. The exception is the data types used in the database, which are defined in the
//!    [`mod@db_types`] module and are public.
//! 2. The engine public API ([`mod@spe_api`]). This provides the public-facing functionality: the per-user shopping
//!    cart, the atomic cart-to-order checkout, and the reconciliation of payment-gateway status reports against order
//!    state. Backends implement the traits in [`mod@traits`] in order to serve the Shop Payment Server; the payment
//!    gateway itself is abstracted behind the [`traits::PaymentGateway`] trait so that the workflow never sees the
//!    wire-level client.
pub mod db_types;
pub mod helpers;
mod spe_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use spe_api::{cart_api::CartApi, order_flow_api::OrderFlowApi, order_query_api::OrderQueryApi};
