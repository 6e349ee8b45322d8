//! Operator notifications for paid orders.
//!
//! When reconciliation moves an order to `paid`, the [`dispatcher`] renders a summary with [`template`] and sends it
//! through a [`mailer::Mailer`]. Nothing that happens here can affect the webhook response: the dispatcher runs as an
//! order-paid hook on its own task, and every failure is logged and dropped.
pub mod dispatcher;
pub mod mailer;
pub mod template;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("No recipients are configured")]
    NoRecipients,
    #[error("Could not send the email. {0}")]
    Transport(String),
    #[error("The email provider rejected the message. Error {status}. {message}")]
    Rejected { status: u16, message: String },
}
