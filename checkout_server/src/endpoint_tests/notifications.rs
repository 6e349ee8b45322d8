//! End-to-end webhook handling against a real database, with a mail provider that is down.
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use actix_web::{http::StatusCode, test::TestRequest, web};
use checkout_engine::{
    db_types::OrderStatusType,
    events::EventHandlers,
    test_utils::{prepare_test_env, random_db_path, tear_down},
    traits::CheckoutDatabase,
    ReconciliationApi,
    SqliteDatabase,
};
use chrono::Utc;
use cpg_common::Secret;
use serde_json::json;
use stripe_tools::webhook::{signature_header, SIGNATURE_HEADER};

use super::helpers::{send_request, WEBHOOK_SECRET};
use crate::{
    config::NotificationConfig,
    notifications::{
        dispatcher::NotificationDispatcher,
        mailer::{Mailer, OutgoingEmail},
        NotificationError,
    },
    routes::PaymentWebhookRoute,
    signed_payload::SignatureVerifier,
};

#[derive(Clone, Default)]
struct DownMailer {
    attempts: Arc<AtomicUsize>,
}

impl Mailer for DownMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), NotificationError> {
        let _ = self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotificationError::Rejected { status: 503, message: "Service unavailable".into() })
    }
}

fn signed_post(body: &str) -> TestRequest {
    let header = signature_header(WEBHOOK_SECRET, Utc::now().timestamp(), body.as_bytes());
    TestRequest::post()
        .uri("/payment-webhook")
        .insert_header((SIGNATURE_HEADER, header))
        .set_payload(body.to_string())
}

#[actix_web::test]
async fn mail_failure_does_not_affect_the_order() {
    let db = prepare_test_env(&random_db_path()).await;
    let mailer = DownMailer::default();
    let attempts = mailer.attempts.clone();
    let config = NotificationConfig { to: vec!["ops@example.com".into()], ..Default::default() };
    let handlers = EventHandlers::new(8, NotificationDispatcher::new(mailer, config).into_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();

    let body = json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_mail",
            "amount_total": 42_000,
            "currency": "eur",
            "customer_email": "alice@example.com",
            "metadata": { "cart": r#"[{"type":"Plongeuse","elements":{"cadran":"Noir"},"total":420}]"# }
        }}
    })
    .to_string();
    let api_db = db.clone();
    let configure = move |cfg: &mut web::ServiceConfig| {
        let api = ReconciliationApi::new(api_db, producers);
        let verifier = SignatureVerifier::new(Secret::new(WEBHOOK_SECRET.to_string()), 300, true);
        cfg.service(PaymentWebhookRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(verifier));
    };
    let (status, _, res) = send_request(signed_post(&body), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, r#"{"received":true}"#);

    let order = db.fetch_order_by_session_id("cs_test_mail").await.unwrap().expect("order was not stored");
    assert_eq!(order.status, OrderStatusType::Paid);
    assert_eq!(order.amount_total.value(), 42_000);
    assert_eq!(order.customer_email.as_deref(), Some("alice@example.com"));
    assert_eq!(order.cart().len(), 1);

    // the notification runs on the handler task
    for _ in 0..50 {
        if attempts.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    let order = db.fetch_order_by_session_id("cs_test_mail").await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Paid);
    tear_down(db).await;
}
