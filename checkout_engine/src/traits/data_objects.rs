use cpg_common::MinorUnits;
use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Everything a payment provider needs to open a hosted checkout session for a single pending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    /// The id of the pending order. Passed to the provider as correlation metadata.
    pub order_id: i64,
    pub amount_total: MinorUnits,
    pub currency: String,
    /// The storefront origin that success and cancel redirects are built from
    pub origin: String,
    /// The serialized cart snapshot, echoed back in the completed-payment event
    pub cart_metadata: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    /// The hosted payment page the customer is redirected to
    pub url: String,
}

impl CheckoutSession {
    pub fn new<S: Into<String>, U: Into<String>>(session_id: S, url: U) -> Self {
        Self { session_id: session_id.into(), url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// This call moved the order for the session to `paid`, either by updating the pending order or by inserting
    /// it directly.
    Finalized(Order),
    /// The order for the session was already `paid`. Nothing was written.
    AlreadyReconciled,
}

impl ReconcileOutcome {
    pub fn is_finalized(&self) -> bool {
        matches!(self, ReconcileOutcome::Finalized(_))
    }

    pub fn order(&self) -> Option<&Order> {
        match self {
            ReconcileOutcome::Finalized(order) => Some(order),
            ReconcileOutcome::AlreadyReconciled => None,
        }
    }
}
