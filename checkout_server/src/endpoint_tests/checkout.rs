use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_engine::{
    db_types::{NewOrder, Order, OrderStatusType},
    helpers::PricingPolicy,
    traits::{CheckoutSession, CheckoutSessionRequest, PaymentProviderError},
    OrderIntakeApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{order, send_request},
    mocks::{MockCheckoutDb, MockProvider},
};
use crate::routes::CheckoutSessionRoute;

const CHECKOUT_URL: &str = "https://checkout.stripe.com/c/pay/cs_test_a1";

fn configure(db: MockCheckoutDb, provider: MockProvider) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderIntakeApi::new(db, provider, PricingPolicy::default());
        cfg.service(CheckoutSessionRoute::<MockCheckoutDb, MockProvider>::new()).app_data(web::Data::new(api));
    }
}

fn pending(new: NewOrder) -> Order {
    let mut order = order(1, OrderStatusType::Created, None);
    order.amount_total = new.amount_total;
    order.currency = new.currency;
    order
}

/// A database that must not be written to
fn untouched_db() -> MockCheckoutDb {
    let mut db = MockCheckoutDb::new();
    db.expect_insert_pending_order().never();
    db.expect_link_session().never();
    db
}

fn untouched_provider() -> MockProvider {
    let mut provider = MockProvider::new();
    provider.expect_create_checkout_session().never();
    provider
}

fn post(body: &Value) -> TestRequest {
    TestRequest::post().uri("/checkout-session").set_json(body)
}

fn error_message(body: &str) -> String {
    let v: Value = serde_json::from_str(body).expect("error body is not JSON");
    v["error"].as_str().expect("no error field").to_string()
}

#[actix_web::test]
async fn opens_a_checkout_session() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutDb::new();
    db.expect_insert_pending_order().times(1).returning(|new| {
        assert_eq!(new.amount_total.value(), 54_950);
        assert_eq!(new.currency, "eur");
        assert_eq!(new.cart_snapshot.len(), 2);
        Ok(pending(new))
    });
    db.expect_link_session().times(1).returning(|id, session| {
        assert_eq!(id, 1);
        assert_eq!(session, "cs_test_a1");
        Ok(order(1, OrderStatusType::Created, Some("cs_test_a1")))
    });
    let mut provider = MockProvider::new();
    provider.expect_create_checkout_session().times(1).returning(|req: CheckoutSessionRequest| {
        assert_eq!(req.order_id, 1);
        assert_eq!(req.amount_total.value(), 54_950);
        assert_eq!(req.origin, "https://shop.example");
        Ok(CheckoutSession::new("cs_test_a1", CHECKOUT_URL))
    });
    let body = json!({
        "cartItems": [
            { "type": "Plongeuse", "elements": { "cadran": "Noir", "bracelet": "Cuir" }, "total": 420 },
            // the client total is ignored; only line totals count
            { "modele": "Chrono", "elements": {}, "total": "129.50" }
        ],
        "origin": "https://shop.example",
        "total": 1
    });
    let (status, headers, body) = send_request(post(&body), configure(db, provider)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!(r#"{{"url":"{CHECKOUT_URL}"}}"#));
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
}

#[actix_web::test]
async fn link_failure_still_returns_the_url() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutDb::new();
    db.expect_insert_pending_order().times(1).returning(|new| Ok(pending(new)));
    db.expect_link_session().times(1).returning(|_, _| {
        Err(checkout_engine::CheckoutDatabaseError::DatabaseError("database is locked".into()))
    });
    let mut provider = MockProvider::new();
    provider.expect_create_checkout_session().returning(|_| Ok(CheckoutSession::new("cs_test_a1", CHECKOUT_URL)));
    let body = json!({ "cartItems": [{ "type": "Plongeuse", "total": 420 }], "origin": "https://shop.example" });
    let (status, _, body) = send_request(post(&body), configure(db, provider)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(CHECKOUT_URL));
}

#[actix_web::test]
async fn empty_cart() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "cartItems": [], "origin": "https://shop.example" });
    let (status, _, body) = send_request(post(&body), configure(untouched_db(), untouched_provider())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!error_message(&body).is_empty());
}

#[actix_web::test]
async fn missing_origin() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "cartItems": [{ "type": "Plongeuse", "total": 420 }] });
    let (status, _, _) = send_request(post(&body), configure(untouched_db(), untouched_provider())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn invalid_prices() {
    let _ = env_logger::try_init().ok();
    for total in [json!(-5), json!(0), json!("abc"), json!(null), json!(20_000.01), json!("NaN")] {
        let body = json!({
            "cartItems": [{ "type": "Plongeuse", "total": 420 }, { "type": "Chrono", "total": total }],
            "origin": "https://shop.example"
        });
        let (status, _, body) = send_request(post(&body), configure(untouched_db(), untouched_provider())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "total {total} was accepted");
        assert!(!error_message(&body).is_empty());
    }
}

#[actix_web::test]
async fn malformed_body() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/checkout-session").set_payload("{ not json");
    let (status, headers, body) = send_request(req, configure(untouched_db(), untouched_provider())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!error_message(&body).is_empty());
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
}

#[actix_web::test]
async fn provider_failure() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutDb::new();
    db.expect_insert_pending_order().times(1).returning(|new| Ok(pending(new)));
    db.expect_link_session().never();
    let mut provider = MockProvider::new();
    provider
        .expect_create_checkout_session()
        .returning(|_| Err(PaymentProviderError::Rejected("Invalid API key provided".into())));
    let body = json!({ "cartItems": [{ "type": "Plongeuse", "total": 420 }], "origin": "https://shop.example" });
    let (status, _, body) = send_request(post(&body), configure(db, provider)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_message(&body).contains("Invalid API key provided"));
}

#[actix_web::test]
async fn wrong_method() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/checkout-session");
    let (status, headers, body) = send_request(req, configure(untouched_db(), untouched_provider())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_message(&body), "Method not allowed");
    assert_eq!(headers.get("Access-Control-Allow-Methods").unwrap(), "POST,OPTIONS");
}

#[actix_web::test]
async fn cors_preflight() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::default().method(actix_web::http::Method::OPTIONS).uri("/checkout-session");
    let (status, headers, _) = send_request(req, configure(untouched_db(), untouched_provider())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
    assert_eq!(headers.get("Access-Control-Allow-Methods").unwrap(), "POST,OPTIONS");
    assert_eq!(headers.get("Access-Control-Allow-Headers").unwrap(), "Content-Type");
}
