//! Sends the operator summary when an order is paid.
//!
//! The dispatcher is registered as an order-paid hook, so it runs on the event handler's tasks and never on the
//! webhook request path. Failures are logged and dropped: a lost email never affects the stored order.
use std::sync::Arc;

use checkout_engine::{
    db_types::Order,
    events::{EventHooks, OrderPaidEvent},
};
use log::*;

use super::{
    mailer::{Mailer, OutgoingEmail},
    template::render_order_paid,
    NotificationError,
};
use crate::config::NotificationConfig;

pub struct NotificationDispatcher<M> {
    mailer: M,
    config: NotificationConfig,
}

impl<M: Mailer + 'static> NotificationDispatcher<M> {
    pub fn new(mailer: M, config: NotificationConfig) -> Self {
        Self { mailer, config }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Renders and sends the summary for `order`.
    pub async fn notify(&self, order: &Order) -> Result<(), NotificationError> {
        if self.config.to.is_empty() {
            return Err(NotificationError::NoRecipients);
        }
        let rendered = render_order_paid(order, &self.config.brand);
        let email = OutgoingEmail {
            from: self.config.from.clone(),
            to: self.config.to.clone(),
            subject: rendered.subject,
            html: rendered.html,
        };
        self.mailer.send(email).await
    }

    pub async fn on_order_paid(&self, event: OrderPaidEvent) {
        let order = &event.order;
        match self.notify(order).await {
            Ok(()) => info!("📧️ Paid-order notification sent for order #{}", order.id),
            Err(NotificationError::NoRecipients) => {
                warn!("📧️ No recipients are configured. Order #{} was paid but nobody was told.", order.id)
            },
            Err(e) => error!("📧️ Could not send the paid-order notification for order #{}. {e}", order.id),
        }
    }

    /// Hooks that run this dispatcher for every paid order.
    pub fn into_hooks(self) -> EventHooks {
        let dispatcher = Arc::new(self);
        let mut hooks = EventHooks::default();
        hooks.on_order_paid(move |ev| {
            let dispatcher = Arc::clone(&dispatcher);
            Box::pin(async move { dispatcher.on_order_paid(ev).await })
        });
        hooks
    }
}
