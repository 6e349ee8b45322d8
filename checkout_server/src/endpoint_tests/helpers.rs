use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use checkout_engine::db_types::{CartItem, Json, MinorUnits, Order, OrderStatusType};
use chrono::{TimeZone, Utc};
use log::debug;

use crate::helpers::{cors_headers, json_config};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Sends `req` to an app set up by `configure`, with the same CORS headers and JSON config as the real server.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, HeaderMap, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().wrap(cors_headers()).app_data(json_config()).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    (status, headers, body)
}

pub fn order(id: i64, status: OrderStatusType, session_id: Option<&str>) -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 10, 14, 9, 30, 0).unwrap();
    Order {
        id,
        amount_total: MinorUnits::from(42_000),
        currency: "eur".to_string(),
        status,
        cart_snapshot: Json(vec![CartItem::new("Plongeuse", 420.0).with_element("cadran", "Noir")]),
        customer_email: None,
        external_session_id: session_id.map(String::from),
        created_at: ts,
        updated_at: ts,
    }
}
