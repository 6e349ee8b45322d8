//! Signed webhook payloads.
//!
//! Stripe signs the exact bytes of each webhook call (see [`stripe_tools::webhook`]). [`SignedPayload`] is an actix
//! extractor that reads the raw body, checks the `Stripe-Signature` header against it, and only then hands the bytes
//! to the handler. Handlers that take a `SignedPayload` therefore never see, let alone parse, an unauthenticated body.
//!
//! The extractor needs a `web::Data<SignatureVerifier>` in the app data.
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use cpg_common::Secret;
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use stripe_tools::{
    webhook::{verify_signature, SIGNATURE_HEADER},
    SignatureError,
};

use crate::{config::WebhookConfig, errors::ServerError};

#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    secret: Secret<String>,
    tolerance_secs: i64,
    // If false, then signatures are not checked and every call is allowed
    enabled: bool,
}

impl SignatureVerifier {
    pub fn new(secret: Secret<String>, tolerance_secs: i64, enabled: bool) -> Self {
        Self { secret, tolerance_secs, enabled }
    }

    pub fn from_config(config: &WebhookConfig) -> Self {
        Self::new(config.signing_secret.clone(), config.tolerance_secs, config.signature_checks)
    }

    /// Checks `header` against `body` at unix time `now`.
    pub fn verify(&self, body: &[u8], header: Option<&str>, now: i64) -> Result<(), SignatureError> {
        if !self.enabled {
            trace!("🔐️ Signature checks are disabled. Allowing request.");
            return Ok(());
        }
        let header = header.ok_or(SignatureError::MissingHeader)?;
        // An unset secret must not turn into "any body signed with the empty key is valid"
        if self.secret.is_empty() {
            warn!("🔐️ No webhook signing secret is configured. Denying access.");
            return Err(SignatureError::Mismatch);
        }
        verify_signature(body, header, self.secret.reveal(), self.tolerance_secs, now)
    }
}

/// The raw, authenticated body of a webhook call.
#[derive(Debug, Clone)]
pub struct SignedPayload(pub web::Bytes);

impl SignedPayload {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl FromRequest for SignedPayload {
    type Error = ServerError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let body = web::Bytes::from_request(&req, payload);
        Box::pin(async move {
            let body = body.await.map_err(|e| {
                warn!("🔐️ Failed to read webhook body: {e}");
                ServerError::InvalidRequestBody(e.to_string())
            })?;
            let verifier = req.app_data::<web::Data<SignatureVerifier>>().ok_or_else(|| {
                ServerError::ConfigurationError("No signature verifier has been registered".to_string())
            })?;
            let header = req.headers().get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
            verifier.verify(body.as_ref(), header, Utc::now().timestamp()).map_err(|e| {
                warn!("🔐️ Rejecting webhook call. {e}");
                ServerError::AuthenticationError(e)
            })?;
            trace!("🔐️ Webhook signature check ✅️");
            Ok(SignedPayload(body))
        })
    }
}
