use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use checkout_engine::{IntakeError, ReconciliationError};
use log::error;
use stripe_tools::SignatureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Webhook signature verification failed. {0}")]
    AuthenticationError(#[from] SignatureError),
    #[error("Malformed event. {0}")]
    MalformedEvent(String),
    #[error("Could not persist the order. {0}")]
    PersistenceError(String),
    #[error("Payment provider error. {0}")]
    PaymentProviderError(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::BAD_REQUEST,
            Self::MalformedEvent(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentProviderError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<IntakeError> for ServerError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::Validation(e) => Self::ValidationError(e.to_string()),
            IntakeError::Persistence(e) => {
                error!("💻️ Order intake could not write to the database. {e}");
                Self::PersistenceError(e.to_string())
            },
            IntakeError::Provider(e) => {
                error!("💻️ Order intake could not open a checkout session. {e}");
                Self::PaymentProviderError(e.to_string())
            },
            IntakeError::Serialization(e) => Self::BackendError(e),
        }
    }
}

impl From<ReconciliationError> for ServerError {
    fn from(e: ReconciliationError) -> Self {
        match e {
            ReconciliationError::InvalidCheckout(e) => Self::MalformedEvent(e),
            ReconciliationError::Persistence(e) => {
                error!("💻️ Reconciliation could not write to the database. {e}");
                Self::PersistenceError(e.to_string())
            },
        }
    }
}
