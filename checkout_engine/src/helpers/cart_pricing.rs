//! # Server-side cart pricing
//!
//! Line totals are submitted by the browser, so they are untrusted. Before anything is stored or sent to the payment
//! provider, every line is re-validated here and the order total is recomputed in integer minor units.
//!
//! A line total is accepted if it is
//!   * a JSON number, or a string holding a decimal number,
//!   * finite,
//!   * strictly positive once rounded to minor units, and
//!   * no more than the configured per-line maximum (in major units).
//!
//! Each line is rounded to minor units *before* summing, so the order total is always the exact sum of what the
//! customer sees per line.
use std::{collections::BTreeMap, fmt::Display};

use cpg_common::{MinorUnits, MINOR_UNITS_PER_MAJOR};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::db_types::{lenient_elements, CartItem};

pub const DEFAULT_MAX_ITEM_TOTAL: f64 = 20_000.0;
pub const DEFAULT_CURRENCY: &str = "eur";

/// A cart line as submitted by the client. The total is kept as a raw JSON value until it has been validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    #[serde(default, alias = "type", alias = "modele")]
    pub model_type: String,
    #[serde(default, deserialize_with = "lenient_elements")]
    pub elements: BTreeMap<String, String>,
    #[serde(default)]
    pub total: Value,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItemRequest {
    pub fn new<S: Into<String>>(model_type: S, total: Value) -> Self {
        Self { model_type: model_type.into(), total, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingPolicy {
    /// The largest accepted line total, in major units
    pub max_item_total: f64,
    /// Lowercase ISO 4217 code that every order is charged in
    pub currency: String,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self { max_item_total: DEFAULT_MAX_ITEM_TOTAL, currency: DEFAULT_CURRENCY.to_string() }
    }
}

impl PricingPolicy {
    pub fn new<S: Into<String>>(max_item_total: f64, currency: S) -> Self {
        Self { max_item_total, currency: currency.into().to_lowercase() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    pub items: Vec<CartItem>,
    pub amount_total: MinorUnits,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceIssue {
    NotNumeric,
    NotFinite,
    NotPositive,
    AboveMaximum(f64),
}

impl Display for PriceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceIssue::NotNumeric => write!(f, "the total is not a number"),
            PriceIssue::NotFinite => write!(f, "the total is not a finite number"),
            PriceIssue::NotPositive => write!(f, "the total must be greater than zero"),
            PriceIssue::AboveMaximum(max) => write!(f, "the total exceeds the maximum of {max}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartValidationError {
    #[error("Missing origin")]
    MissingOrigin,
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Invalid price for item {index}: {reason}")]
    InvalidPrice { index: usize, reason: PriceIssue },
    #[error("The cart total is too large")]
    AmountOverflow,
}

/// Coerces a claimed line total into a number. Only numbers and numeric strings qualify.
fn coerce_total(total: &Value) -> Result<f64, PriceIssue> {
    match total {
        Value::Number(n) => n.as_f64().ok_or(PriceIssue::NotNumeric),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| PriceIssue::NotNumeric),
        _ => Err(PriceIssue::NotNumeric),
    }
}

fn price_line(total: &Value, policy: &PricingPolicy) -> Result<(f64, MinorUnits), PriceIssue> {
    let major = coerce_total(total)?;
    if !major.is_finite() {
        return Err(PriceIssue::NotFinite);
    }
    if major > policy.max_item_total {
        return Err(PriceIssue::AboveMaximum(policy.max_item_total));
    }
    let minor = MinorUnits::from_major(major).map_err(|_| PriceIssue::NotFinite)?;
    if minor.value() <= 0 {
        return Err(PriceIssue::NotPositive);
    }
    Ok((major, minor))
}

/// Validates the client's request and computes the authoritative order total.
///
/// Nothing is persisted here, so a failure leaves no trace.
pub fn price_cart(
    items: &[CartItemRequest],
    origin: &str,
    policy: &PricingPolicy,
) -> Result<PricedCart, CartValidationError> {
    if origin.trim().is_empty() {
        return Err(CartValidationError::MissingOrigin);
    }
    if items.is_empty() {
        return Err(CartValidationError::EmptyCart);
    }
    let mut amount_total = MinorUnits::from(0);
    let mut priced = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let (major, minor) = price_line(&item.total, policy).map_err(|reason| {
            debug!("💰️ Rejecting cart line {index} ({:?}): {reason}", item.total);
            CartValidationError::InvalidPrice { index, reason }
        })?;
        amount_total = amount_total.checked_add(minor).ok_or(CartValidationError::AmountOverflow)?;
        priced.push(CartItem {
            model_type: item.model_type.clone(),
            elements: item.elements.clone(),
            total: major,
            image: item.image.clone(),
        });
    }
    debug!(
        "💰️ Priced {} cart lines at {amount_total} {} ({} minor units per major unit)",
        priced.len(),
        policy.currency,
        MINOR_UNITS_PER_MAJOR
    );
    Ok(PricedCart { items: priced, amount_total, currency: policy.currency.clone() })
}

/// Parses the cart embedded in a checkout session's metadata. Missing or malformed metadata yields an empty cart.
pub fn parse_cart_metadata(metadata: Option<&str>) -> Vec<CartItem> {
    let Some(raw) = metadata else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<CartItem>>(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("💰️ Ignoring malformed cart metadata. {e}");
            Vec::new()
        },
    }
}
