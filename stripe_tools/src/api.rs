use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
};
use serde::de::DeserializeOwned;

use crate::{
    config::StripeConfig,
    data_objects::{CheckoutSession, NewCheckoutSession},
    helpers::stripe_error_message,
    StripeApiError,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Sends a form-encoded POST request, which is how Stripe expects all write calls.
    pub async fn form_post<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending Stripe request: POST {url}");
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| StripeApiError::RestRequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("Stripe request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message: stripe_error_message(&body) })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url)
    }

    /// Opens a hosted checkout session and returns its id and redirect URL.
    pub async fn create_checkout_session(
        &self,
        session: NewCheckoutSession,
    ) -> Result<CheckoutSession, StripeApiError> {
        debug!(
            "Creating checkout session for {} {} (order {:?})",
            session.amount_total,
            session.currency,
            session.order_id
        );
        let params = session.to_form_params();
        let result = self.form_post::<CheckoutSession>("/checkout/sessions", &params).await?;
        if result.url.is_none() {
            return Err(StripeApiError::MissingCheckoutUrl(result.id));
        }
        info!("Created checkout session {}", result.id);
        Ok(result)
    }
}
