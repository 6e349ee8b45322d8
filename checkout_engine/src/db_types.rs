use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use cpg_common::MinorUnits;
use log::error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
pub use sqlx::types::Json;
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been recorded and a checkout session may have been opened for it, but no payment has been
    /// confirmed yet.
    Created,
    /// The payment provider has confirmed the payment. This status is terminal.
    Paid,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Created => write!(f, "created"),
            OrderStatusType::Paid => write!(f, "paid"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "paid" => Ok(Self::Paid),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to 'created'");
            OrderStatusType::Created
        })
    }
}

//--------------------------------------       CartItem        ---------------------------------------------------------
/// One configured product in a cart.
///
/// This is the form that is stored in the order's cart snapshot and embedded in the checkout session metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default, alias = "type", alias = "modele")]
    pub model_type: String,
    /// Component slot name → selected option label
    #[serde(default, deserialize_with = "lenient_elements")]
    pub elements: BTreeMap<String, String>,
    /// Line total in major currency units
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    pub fn new<S: Into<String>>(model_type: S, total: f64) -> Self {
        Self { model_type: model_type.into(), total, ..Default::default() }
    }

    pub fn with_element<K: Into<String>, V: Into<String>>(mut self, slot: K, option: V) -> Self {
        self.elements.insert(slot.into(), option.into());
        self
    }

    pub fn with_image<S: Into<String>>(mut self, url: S) -> Self {
        self.image = Some(url.into());
        self
    }
}

/// Element labels arrive from a browser configurator, so numbers and booleans are accepted and stringified. Nulls
/// are dropped.
pub(crate) fn lenient_elements<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where D: Deserializer<'de> {
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    let elements = raw
        .into_iter()
        .filter_map(|(slot, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((slot, s)),
            other => Some((slot, other.to_string())),
        })
        .collect();
    Ok(elements)
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub amount_total: MinorUnits,
    pub currency: String,
    pub status: OrderStatusType,
    pub cart_snapshot: Json<Vec<CartItem>>,
    pub customer_email: Option<String>,
    pub external_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatusType::Paid
    }

    pub fn cart(&self) -> &[CartItem] {
        self.cart_snapshot.0.as_slice()
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// A priced cart, ready to be stored as a pending order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// The server-computed total of the cart
    pub amount_total: MinorUnits,
    /// Lowercase ISO 4217 code
    pub currency: String,
    pub cart_snapshot: Vec<CartItem>,
}

impl NewOrder {
    pub fn new<S: Into<String>>(amount_total: MinorUnits, currency: S, cart_snapshot: Vec<CartItem>) -> Self {
        Self { amount_total, currency: currency.into().to_lowercase(), cart_snapshot }
    }
}

//--------------------------------------   CompletedCheckout   ---------------------------------------------------------
/// The provider's confirmation that a checkout session has been paid. The amount and currency carried here are
/// authoritative and replace whatever was computed at intake.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCheckout {
    /// The provider's checkout session id. This is the idempotency key for reconciliation.
    pub session_id: String,
    pub amount_total: MinorUnits,
    pub currency: String,
    pub customer_email: Option<String>,
    /// The cart embedded in the session metadata. Only used when no order exists for the session yet.
    pub cart_snapshot: Vec<CartItem>,
    /// The order id that the session was opened for, if the provider echoed it back.
    pub order_ref: Option<String>,
}

impl CompletedCheckout {
    pub fn new<S: Into<String>, C: Into<String>>(session_id: S, amount_total: MinorUnits, currency: C) -> Self {
        Self {
            session_id: session_id.into(),
            amount_total,
            currency: currency.into().to_lowercase(),
            customer_email: None,
            cart_snapshot: Vec::new(),
            order_ref: None,
        }
    }

    pub fn with_customer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_cart(mut self, cart: Vec<CartItem>) -> Self {
        self.cart_snapshot = cart;
        self
    }

    pub fn with_order_ref<S: Into<String>>(mut self, order_ref: S) -> Self {
        self.order_ref = Some(order_ref.into());
        self
    }
}
