use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use checkout_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    OrderIntakeApi,
    ReconciliationApi,
    SqliteDatabase,
};
use log::*;
use stripe_tools::StripeApi;

use crate::{
    config::{NotificationConfig, ServerConfig},
    errors::ServerError,
    helpers::{cors_headers, json_config},
    integrations::stripe::StripeProvider,
    notifications::{
        dispatcher::NotificationDispatcher,
        mailer::{LogMailer, ResendMailer},
    },
    routes::{health, CheckoutSessionRoute, PaymentWebhookRoute},
    signed_payload::SignatureVerifier,
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let stripe = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let provider = StripeProvider::new(stripe);
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, notification_hooks(&config.notifications));
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, provider, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Paid orders are emailed through Resend if an API key is configured, and logged otherwise.
pub fn notification_hooks(config: &NotificationConfig) -> EventHooks {
    if config.email_enabled() {
        info!("📧️ Paid-order notifications will be sent via {}", config.resend_api_url);
        NotificationDispatcher::new(ResendMailer::from_config(config), config.clone()).into_hooks()
    } else {
        NotificationDispatcher::new(LogMailer, config.clone()).into_hooks()
    }
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: StripeProvider,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let verifier = SignatureVerifier::from_config(&config.webhook);
    let pricing = config.pricing.clone();
    let srv = HttpServer::new(move || {
        let intake_api = OrderIntakeApi::new(db.clone(), provider.clone(), pricing.clone());
        let reconciliation_api = ReconciliationApi::new(db.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %r").log_target("cpg::access_log"))
            .wrap(cors_headers())
            .app_data(json_config())
            .app_data(web::Data::new(intake_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(verifier.clone()))
            .service(health)
            .service(CheckoutSessionRoute::<SqliteDatabase, StripeProvider>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
