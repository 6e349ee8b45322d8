use std::future::Future;

use cpg_common::Secret;
use log::*;
use reqwest::Client;
use serde::Serialize;

use super::NotificationError;
use crate::config::NotificationConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Delivers a rendered email. Implementations must not retry forever; a failure is reported once and then forgotten.
pub trait Mailer: Send + Sync {
    fn send(&self, email: OutgoingEmail) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

//--------------------------------------------------  ResendMailer  ----------------------------------------------------
/// Sends email through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_url: String,
    api_key: Secret<String>,
}

impl ResendMailer {
    pub fn new(api_url: &str, api_key: Secret<String>) -> Self {
        Self { client: Client::new(), api_url: api_url.trim_end_matches('/').to_string(), api_key }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(&config.resend_api_url, config.resend_api_key.clone())
    }

    fn url(&self) -> String {
        format!("{}/emails", self.api_url)
    }
}

impl Mailer for ResendMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotificationError> {
        trace!("📧️ Sending '{}' to {}", email.subject, email.to.join(", "));
        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.reveal())
            .json(&email)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected { status: status.as_u16(), message });
        }
        debug!("📧️ Email '{}' accepted by the provider", email.subject);
        Ok(())
    }
}

//---------------------------------------------------  LogMailer  ------------------------------------------------------
/// Writes notifications to the log. Used when no email provider is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotificationError> {
        info!("📧️ [not sent] '{}' for {} ({} bytes of HTML)", email.subject, email.to.join(", "), email.html.len());
        Ok(())
    }
}
