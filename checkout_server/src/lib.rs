//! # Checkout payment gateway server
//! This crate hosts the HTTP front end of the gateway. It is responsible for:
//! * Accepting carts from the storefront, re-pricing them and opening Stripe Checkout sessions.
//! * Receiving Stripe webhooks, authenticating them against the `Stripe-Signature` header, and handing completed
//!   checkouts to the reconciliation engine.
//! * Emailing a summary of every paid order to the shop operators.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/checkout-session`: `POST` a cart, receive a checkout URL. `OPTIONS` answers CORS preflights.
//! * `/payment-webhook`: The Stripe webhook endpoint.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod notifications;
pub mod routes;
pub mod server;
pub mod signed_payload;

#[cfg(test)]
mod endpoint_tests;
