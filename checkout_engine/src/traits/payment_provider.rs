use thiserror::Error;

use crate::traits::data_objects::{CheckoutSession, CheckoutSessionRequest};

#[derive(Debug, Clone, Error)]
pub enum PaymentProviderError {
    #[error("The payment provider could not be reached. {0}")]
    Unavailable(String),
    #[error("The payment provider rejected the request. {0}")]
    Rejected(String),
    #[error("The payment provider returned an unexpected response. {0}")]
    InvalidResponse(String),
}

/// A hosted checkout provider.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Opens a hosted checkout session for exactly `request.amount_total` in `request.currency`.
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentProviderError>;
}
