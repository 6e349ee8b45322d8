//! Glue between the checkout engine and the Stripe client.
use checkout_engine::{
    db_types::{CompletedCheckout, MinorUnits},
    helpers::parse_cart_metadata,
    CheckoutSession,
    CheckoutSessionRequest,
    PaymentProvider,
    PaymentProviderError,
};
use log::*;
use stripe_tools::{CheckoutSessionObject, NewCheckoutSession, StripeApi, StripeApiError};

use crate::errors::ServerError;

/// Stripe's hosted Checkout as a [`PaymentProvider`].
#[derive(Clone)]
pub struct StripeProvider {
    api: StripeApi,
}

impl StripeProvider {
    pub fn new(api: StripeApi) -> Self {
        Self { api }
    }
}

fn provider_error(e: StripeApiError) -> PaymentProviderError {
    match e {
        StripeApiError::Initialization(_) | StripeApiError::RestRequestError(_) => {
            PaymentProviderError::Unavailable(e.to_string())
        },
        StripeApiError::QueryError { .. } => PaymentProviderError::Rejected(e.to_string()),
        StripeApiError::RestResponseError(_) | StripeApiError::JsonError(_) | StripeApiError::MissingCheckoutUrl(_) => {
            PaymentProviderError::InvalidResponse(e.to_string())
        },
    }
}

impl PaymentProvider for StripeProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        let session = NewCheckoutSession {
            amount_total: request.amount_total,
            currency: request.currency,
            product_name: self.api.config().product_name.clone(),
            origin: request.origin,
            order_id: Some(request.order_id.to_string()),
            cart_metadata: Some(request.cart_metadata),
        };
        let created = self.api.create_checkout_session(session).await.map_err(provider_error)?;
        let url = created.url.ok_or_else(|| PaymentProviderError::InvalidResponse("No checkout URL".to_string()))?;
        Ok(CheckoutSession::new(created.id, url))
    }
}

/// Extracts the reconciliation input from a completed checkout session.
///
/// Stripe always sends the amount and currency for completed sessions, so their absence makes the event malformed.
pub fn completed_checkout(session: &CheckoutSessionObject) -> Result<CompletedCheckout, ServerError> {
    let amount = session
        .amount_total
        .ok_or_else(|| ServerError::MalformedEvent(format!("Session {} has no amount_total", session.id)))?;
    if amount < 0 {
        return Err(ServerError::MalformedEvent(format!("Session {} has a negative amount_total", session.id)));
    }
    let currency = session
        .currency
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ServerError::MalformedEvent(format!("Session {} has no currency", session.id)))?;
    if let Some(status) = session.payment_status.as_deref() {
        debug!("💳️ Session {} payment_status is '{status}'", session.id);
    }
    let cart = parse_cart_metadata(session.joined_metadata_value("cart").as_deref());
    let mut checkout = CompletedCheckout::new(session.id.as_str(), MinorUnits::from(amount), currency).with_cart(cart);
    if let Some(email) = session.payer_email() {
        checkout = checkout.with_customer_email(email);
    }
    if let Some(order_ref) = session.metadata_value("order_id").or(session.client_reference_id.as_deref()) {
        checkout = checkout.with_order_ref(order_ref);
    }
    Ok(checkout)
}
