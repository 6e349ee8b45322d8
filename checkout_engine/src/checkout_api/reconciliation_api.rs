use std::fmt::Debug;

use log::*;

use crate::{
    checkout_api::errors::ReconciliationError,
    db_types::{CompletedCheckout, Order},
    events::{EventProducers, OrderPaidEvent},
    traits::{CheckoutDatabase, ReconcileOutcome},
};

/// `ReconciliationApi` applies completed-payment events to the order store.
///
/// Events are delivered at least once and in no particular order relative to intake, so every call is idempotent on
/// the session id. Exactly one call per session observes [`ReconcileOutcome::Finalized`], and only that call raises an
/// [`OrderPaidEvent`].
pub struct ReconciliationApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> ReconciliationApi<B>
where B: CheckoutDatabase
{
    pub async fn reconcile(&self, checkout: CompletedCheckout) -> Result<ReconcileOutcome, ReconciliationError> {
        if checkout.session_id.trim().is_empty() {
            return Err(ReconciliationError::InvalidCheckout("The session id is empty".to_string()));
        }
        if checkout.amount_total.value() < 0 {
            return Err(ReconciliationError::InvalidCheckout(format!(
                "Negative amount {} for session {}",
                checkout.amount_total, checkout.session_id
            )));
        }
        if let Some(order_ref) = &checkout.order_ref {
            trace!("🔄️ Session {} was opened for order {order_ref}", checkout.session_id);
        }
        let outcome = self.db.finalize_order(&checkout).await?;
        match &outcome {
            ReconcileOutcome::Finalized(order) => {
                info!(
                    "🔄️ Order #{} paid via session {}: {} {}",
                    order.id, checkout.session_id, order.amount_total, order.currency
                );
                self.call_order_paid_hook(order.clone());
            },
            ReconcileOutcome::AlreadyReconciled => {
                info!("🔄️ Session {} was already reconciled. Nothing to do.", checkout.session_id);
            },
        }
        Ok(outcome)
    }

    fn call_order_paid_hook(&self, order: Order) {
        if self.producers.order_paid_producer.is_empty() {
            return;
        }
        debug!("🔄️ Notifying order paid hook subscribers");
        self.producers.publish_order_paid(OrderPaidEvent::new(order));
    }
}
