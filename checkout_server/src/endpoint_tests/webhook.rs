use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_engine::{
    db_types::{CompletedCheckout, OrderStatusType},
    events::EventProducers,
    CheckoutDatabaseError,
    ReconcileOutcome,
    ReconciliationApi,
};
use chrono::Utc;
use cpg_common::Secret;
use serde_json::json;
use stripe_tools::webhook::{signature_header, SIGNATURE_HEADER};

use super::{
    helpers::{order, send_request, WEBHOOK_SECRET},
    mocks::MockCheckoutDb,
};
use crate::{routes::PaymentWebhookRoute, signed_payload::SignatureVerifier};

fn configure(db: MockCheckoutDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = ReconciliationApi::new(db, EventProducers::default());
        let verifier = SignatureVerifier::new(Secret::new(WEBHOOK_SECRET.to_string()), 300, true);
        cfg.service(PaymentWebhookRoute::<MockCheckoutDb>::new())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(verifier));
    }
}

fn untouched_db() -> MockCheckoutDb {
    let mut db = MockCheckoutDb::new();
    db.expect_finalize_order().never();
    db
}

fn completed_event(session_id: &str, amount: i64) -> String {
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "created": 1_728_900_000,
        "livemode": false,
        "data": { "object": {
            "id": session_id,
            "object": "checkout.session",
            "amount_total": amount,
            "currency": "eur",
            "payment_status": "paid",
            "customer_details": { "email": "alice@example.com", "name": "Alice" },
            "metadata": {
                "order_id": "1",
                "cart": r#"[{"type":"Plongeuse","elements":{"cadran":"Noir"},"total":420.0}]"#
            }
        }}
    })
    .to_string()
}

fn signed_post(body: &str) -> TestRequest {
    let header = signature_header(WEBHOOK_SECRET, Utc::now().timestamp(), body.as_bytes());
    TestRequest::post()
        .uri("/payment-webhook")
        .insert_header((SIGNATURE_HEADER, header))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string())
}

#[actix_web::test]
async fn completed_checkout_is_reconciled() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutDb::new();
    db.expect_finalize_order().times(1).returning(|checkout: &CompletedCheckout| {
        assert_eq!(checkout.session_id, "cs_test_a1");
        assert_eq!(checkout.amount_total.value(), 42_000);
        assert_eq!(checkout.currency, "eur");
        assert_eq!(checkout.customer_email.as_deref(), Some("alice@example.com"));
        assert_eq!(checkout.cart_snapshot.len(), 1);
        assert_eq!(checkout.order_ref.as_deref(), Some("1"));
        Ok(ReconcileOutcome::Finalized(order(1, OrderStatusType::Paid, Some("cs_test_a1"))))
    });
    let (status, _, body) = send_request(signed_post(&completed_event("cs_test_a1", 42_000)), configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn redelivery_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutDb::new();
    db.expect_finalize_order().times(1).returning(|_| Ok(ReconcileOutcome::AlreadyReconciled));
    let (status, _, body) = send_request(signed_post(&completed_event("cs_test_a1", 42_000)), configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn invalid_signature_has_no_side_effects() {
    let _ = env_logger::try_init().ok();
    let body = completed_event("cs_test_a1", 42_000);
    let header = signature_header("whsec_someone_else", Utc::now().timestamp(), body.as_bytes());
    let req =
        TestRequest::post().uri("/payment-webhook").insert_header((SIGNATURE_HEADER, header)).set_payload(body.clone());
    let (status, _, res) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res.contains("signature"), "{res}");
}

#[actix_web::test]
async fn tampered_body_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = completed_event("cs_test_a1", 42_000);
    let header = signature_header(WEBHOOK_SECRET, Utc::now().timestamp(), body.as_bytes());
    let tampered = body.replace("42000", "1");
    let req = TestRequest::post().uri("/payment-webhook").insert_header((SIGNATURE_HEADER, header)).set_payload(tampered);
    let (status, _, _) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn missing_signature() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/payment-webhook").set_payload(completed_event("cs_test_a1", 42_000));
    let (status, _, _) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn other_events_are_ignored() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "id": "evt_2",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_123", "amount": 42000 } }
    })
    .to_string();
    let (status, _, res) = send_request(signed_post(&body), configure(untouched_db())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, r#"{"received":true}"#);
}

#[actix_web::test]
async fn malformed_envelope() {
    let _ = env_logger::try_init().ok();
    let (status, _, _) = send_request(signed_post("{ definitely not json"), configure(untouched_db())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let no_type = json!({ "id": "evt_3", "data": { "object": {} } }).to_string();
    let (status, _, _) = send_request(signed_post(&no_type), configure(untouched_db())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn completed_session_without_amount() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "id": "evt_4",
        "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_test_a1", "currency": "eur" } }
    })
    .to_string();
    let (status, _, res) = send_request(signed_post(&body), configure(untouched_db())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res.contains("amount_total"), "{res}");
}

#[actix_web::test]
async fn persistence_failure() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutDb::new();
    db.expect_finalize_order()
        .times(1)
        .returning(|_| Err(CheckoutDatabaseError::DatabaseError("database is locked".into())));
    let (status, _, res) = send_request(signed_post(&completed_event("cs_test_a1", 42_000)), configure(db)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.contains("error"));
}

#[actix_web::test]
async fn wrong_method() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/payment-webhook");
    let (status, _, res) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res, r#"{"error":"Method not allowed"}"#);
}
