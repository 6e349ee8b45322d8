//! A deliberately small Stripe client.
//!
//! Only the pieces of the Stripe API that the checkout gateway needs are covered:
//! * Creating hosted Checkout sessions ([`StripeApi::create_checkout_session`]).
//! * Deserializing webhook event envelopes ([`StripeEvent`]).
//! * Verifying the `Stripe-Signature` header of incoming webhook calls ([`webhook`]).
mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;
pub mod webhook;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{
    CheckoutSession,
    CheckoutSessionObject,
    CustomerDetails,
    EventData,
    NewCheckoutSession,
    StripeEvent,
    CHECKOUT_SESSION_COMPLETED,
};
pub use error::StripeApiError;
pub use webhook::SignatureError;
