//! Behaviour contracts for the engine.
//!
//! Backends implement [`CartManagement`], [`OrderManagement`] and [`StorefrontDatabase`] to serve the payment
//! workflow. The external payment service is abstracted behind [`PaymentGateway`], so the workflow never sees the
//! wire-level client and tests can substitute a stub.
mod cart_management;
mod order_management;
mod payment_gateway;
mod storefront_database;

pub use cart_management::CartManagement;
pub use order_management::OrderManagement;
pub use payment_gateway::{GatewayError, GatewayPaymentStatus, PaymentGateway, PaymentLink, PaymentLinkRequest};
pub use storefront_database::{StorefrontDatabase, StorefrontError};
