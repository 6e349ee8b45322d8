use actix_web::{error::JsonPayloadError, middleware::DefaultHeaders, web, HttpRequest};
use log::debug;

use crate::errors::ServerError;

/// Every response carries these, including errors.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "POST,OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

/// JSON bodies are accepted without a JSON content type, and payload errors are reported as `400 { error }`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().content_type_required(false).error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Rejecting body sent to {}. {err}", req.path());
    ServerError::InvalidRequestBody(err.to_string()).into()
}
