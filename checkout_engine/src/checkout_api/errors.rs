use thiserror::Error;

use crate::{
    helpers::CartValidationError,
    traits::{CheckoutDatabaseError, PaymentProviderError},
};

#[derive(Debug, Clone, Error)]
pub enum IntakeError {
    #[error("{0}")]
    Validation(#[from] CartValidationError),
    #[error("Could not store the order. {0}")]
    Persistence(#[from] CheckoutDatabaseError),
    #[error("Could not open a checkout session. {0}")]
    Provider(#[from] PaymentProviderError),
    #[error("Could not serialize the cart. {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("The checkout event is not usable. {0}")]
    InvalidCheckout(String),
    #[error("Could not reconcile the order. {0}")]
    Persistence(#[from] CheckoutDatabaseError),
}
