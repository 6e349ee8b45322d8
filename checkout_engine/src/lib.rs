//! Checkout Engine
//!
//! The checkout engine takes storefront carts through to paid orders. It is provider-agnostic: the payment provider
//! and the order store are both plugged in through traits.
//!
//! The library is divided into these sections:
//! 1. Database management and control ([`mod@sqlite`], [`traits::CheckoutDatabase`]). The data types used in the
//!    database are defined in the [`db_types`] module and are public.
//! 2. Cart pricing ([`helpers`]). Client-submitted totals are never trusted; every line is re-validated and the order
//!    total is recomputed in minor units.
//! 3. The public API ([`mod@checkout_api`]): [`OrderIntakeApi`] opens checkout sessions and [`ReconciliationApi`]
//!    applies the provider's completed-payment events, exactly once per session.
//!
//! The engine also emits events. When reconciliation moves an order to `paid`, an [`events::OrderPaidEvent`] is
//! published to any hooks registered through [`events::EventHooks`].
pub mod checkout_api;
pub mod db_types;
pub mod events;
pub mod helpers;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(feature = "test_utils")]
pub mod test_utils;

pub use checkout_api::{
    checkout_objects,
    errors::{IntakeError, ReconciliationError},
    intake_api::OrderIntakeApi,
    reconciliation_api::ReconciliationApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    CheckoutDatabase,
    CheckoutDatabaseError,
    CheckoutSession,
    CheckoutSessionRequest,
    PaymentProvider,
    PaymentProviderError,
    ReconcileOutcome,
};
