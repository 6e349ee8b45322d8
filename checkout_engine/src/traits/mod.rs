//! # Backend contracts
//!
//! The checkout engine does not care where orders live or who collects the money. The traits in this module are the
//! two seams it depends on:
//!
//! * [`CheckoutDatabase`] is the durable order store. It owns the uniqueness constraint on the provider's session id,
//!   which is the only thing that coordinates concurrent reconciliation attempts.
//! * [`PaymentProvider`] opens hosted checkout sessions for a fixed amount.
mod checkout_database;
mod data_objects;
mod payment_provider;

pub use checkout_database::{CheckoutDatabase, CheckoutDatabaseError};
pub use data_objects::{CheckoutSession, CheckoutSessionRequest, ReconcileOutcome};
pub use payment_provider::{PaymentProvider, PaymentProviderError};
