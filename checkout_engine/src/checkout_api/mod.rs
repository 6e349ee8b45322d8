//! # Checkout engine public API
//!
//! * [`intake_api`] turns a client's cart into a priced pending order and a hosted checkout session.
//! * [`reconciliation_api`] applies the payment provider's completed-payment events to the order store, exactly once
//!   per checkout session.
//!
//! Both APIs are created by supplying backends that implement the traits in [`crate::traits`]:
//!
//! ```rust,ignore
//! use checkout_engine::{events::EventProducers, ReconciliationApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = ReconciliationApi::new(db, EventProducers::default());
//! let outcome = api.reconcile(checkout).await?;
//! ```
pub mod checkout_objects;
pub mod errors;
pub mod intake_api;
pub mod reconciliation_api;
