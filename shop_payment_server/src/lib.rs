//! # Shop Payment Server
//! The HTTP face of the storefront's order and payment workflow. It is responsible for:
//! * the per-user shopping cart endpoints,
//! * converting a cart into an order with a hosted payment link,
//! * receiving payment-status webhooks from the gateway and exposing a polling endpoint for clients.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Authenticated routes (bearer JWT): `/cart/*`, `/order/place`, `/order/my-orders`, `/order/{id}`, and the
//! admin-only `/order/{id}/status`. Unauthenticated routes: `/health`, the gateway webhooks `/order/webhook` and
//! `/payment/webhook`, and the polling endpoint `/payment/status/{order_code}`.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod dto;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
