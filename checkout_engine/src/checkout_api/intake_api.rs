use std::fmt::Debug;

use log::*;

use crate::{
    checkout_api::{
        checkout_objects::{CheckoutRequest, CheckoutResult},
        errors::IntakeError,
    },
    db_types::NewOrder,
    helpers::{price_cart, PricingPolicy},
    traits::{CheckoutDatabase, CheckoutSessionRequest, PaymentProvider},
};

/// `OrderIntakeApi` accepts carts from the storefront, prices them under server authority and opens a hosted
/// checkout session for the result.
pub struct OrderIntakeApi<B, P> {
    db: B,
    provider: P,
    policy: PricingPolicy,
}

impl<B, P> Debug for OrderIntakeApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderIntakeApi ({:?})", self.policy)
    }
}

impl<B, P> OrderIntakeApi<B, P> {
    pub fn new(db: B, provider: P, policy: PricingPolicy) -> Self {
        Self { db, provider, policy }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, P> OrderIntakeApi<B, P>
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    /// Prices the cart, stores it as a pending order and opens a checkout session for exactly the computed total.
    ///
    /// Validation happens before anything is written. Once the session is open, its id is linked to the order. A
    /// failure to link is logged but does not fail the request, since reconciliation finds or creates the order by
    /// session id regardless.
    pub async fn open_checkout(&self, request: CheckoutRequest) -> Result<CheckoutResult, IntakeError> {
        let cart = price_cart(&request.cart_items, &request.origin, &self.policy)?;
        let cart_metadata = serde_json::to_string(&cart.items).map_err(|e| IntakeError::Serialization(e.to_string()))?;
        let new_order = NewOrder::new(cart.amount_total, cart.currency, cart.items);
        let order = self.db.insert_pending_order(new_order).await?;
        debug!("🛒️ Order #{} created for {} {}", order.id, order.amount_total, order.currency);
        let session_request = CheckoutSessionRequest {
            order_id: order.id,
            amount_total: order.amount_total,
            currency: order.currency.clone(),
            origin: request.origin.trim().to_string(),
            cart_metadata,
        };
        let session = self.provider.create_checkout_session(session_request).await.map_err(|e| {
            warn!("🛒️ Could not open a checkout session for order #{}. {e}", order.id);
            e
        })?;
        info!("🛒️ Checkout session {} opened for order #{}", session.session_id, order.id);
        let order = match self.db.link_session(order.id, &session.session_id).await {
            Ok(linked) => linked,
            Err(e) => {
                error!("🛒️ Could not link session {} to order #{}. {e}", session.session_id, order.id);
                order
            },
        };
        Ok(CheckoutResult { order, session_id: session.session_id, url: session.url })
    }
}
