use serde::{Deserialize, Serialize};

use crate::{db_types::Order, helpers::CartItemRequest};

/// The body of a checkout request, as sent by the storefront.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItemRequest>,
    #[serde(default)]
    pub origin: String,
}

impl CheckoutRequest {
    pub fn new<S: Into<String>>(cart_items: Vec<CartItemRequest>, origin: S) -> Self {
        Self { cart_items, origin: origin.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutResult {
    /// The order as it stands after intake. `external_session_id` is `None` if linking failed.
    pub order: Order,
    pub session_id: String,
    pub url: String,
}
