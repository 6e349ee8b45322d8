use std::collections::HashMap;

use cpg_common::MinorUnits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::helpers::{join_metadata_value, split_metadata_value};

/// The event type Stripe sends once a hosted checkout has been completed by the payer.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

//--------------------------------------   NewCheckoutSession   --------------------------------------------------------
/// Parameters for a hosted checkout session that charges a single, server-computed amount.
#[derive(Debug, Clone, Default)]
pub struct NewCheckoutSession {
    pub amount_total: MinorUnits,
    pub currency: String,
    pub product_name: String,
    /// The storefront origin, e.g. `https://shop.example`. Success and cancel URLs are derived from it.
    pub origin: String,
    /// Correlation id echoed back in the session metadata and as `client_reference_id`.
    pub order_id: Option<String>,
    /// Serialized cart, echoed back in the `checkout.session.completed` event. Long carts are split over several
    /// metadata keys.
    pub cart_metadata: Option<String>,
}

impl NewCheckoutSession {
    pub fn success_url(&self) -> String {
        format!("{}/success.html?session_id={{CHECKOUT_SESSION_ID}}", self.origin.trim_end_matches('/'))
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/cancel.html", self.origin.trim_end_matches('/'))
    }

    /// Stripe's form-encoded representation of the session parameters.
    pub fn to_form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("line_items[0][price_data][currency]".to_string(), self.currency.clone()),
            ("line_items[0][price_data][unit_amount]".to_string(), self.amount_total.value().to_string()),
            ("line_items[0][price_data][product_data][name]".to_string(), self.product_name.clone()),
            ("success_url".to_string(), self.success_url()),
            ("cancel_url".to_string(), self.cancel_url()),
        ];
        if let Some(order_id) = &self.order_id {
            params.push(("client_reference_id".to_string(), order_id.clone()));
            params.push(("metadata[order_id]".to_string(), order_id.clone()));
        }
        if let Some(cart) = self.cart_metadata.as_deref() {
            let parts = split_metadata_value("cart", cart);
            params.extend(parts.into_iter().map(|(key, value)| (format!("metadata[{key}]"), value)));
        }
        params
    }
}

//--------------------------------------    CheckoutSession     --------------------------------------------------------
/// The subset of Stripe's checkout session object returned when a session is created.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
}

//--------------------------------------      StripeEvent       --------------------------------------------------------
/// A Stripe webhook event envelope. The `data.object` payload is kept as raw JSON since its shape depends on
/// `event_type`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventData {
    pub object: Value,
}

impl StripeEvent {
    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == CHECKOUT_SESSION_COMPLETED
    }

    /// Interprets the event payload as a checkout session.
    pub fn checkout_session(&self) -> Result<CheckoutSessionObject, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

//--------------------------------------  CheckoutSessionObject  -------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub customer_email: Option<String>,
    pub client_reference_id: Option<String>,
    pub payment_status: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl CheckoutSessionObject {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.get(key)).map(String::as_str)
    }

    /// A metadata value that may have been split over `{key}_0`, `{key}_1`, ... when the session was created.
    pub fn joined_metadata_value(&self, key: &str) -> Option<String> {
        self.metadata.as_ref().and_then(|m| join_metadata_value(m, key))
    }

    /// The payer's email, preferring the details collected on the checkout page.
    pub fn payer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(self.customer_email.as_deref())
            .filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const COMPLETED_EVENT: &str = r#"{
      "id": "evt_1",
      "object": "event",
      "type": "checkout.session.completed",
      "created": 1728900000,
      "livemode": false,
      "data": { "object": {
        "id": "cs_test_a1",
        "object": "checkout.session",
        "amount_total": 42000,
        "currency": "eur",
        "customer_details": { "email": "ada@example.com", "name": null },
        "customer_email": null,
        "payment_status": "paid",
        "metadata": { "order_id": "7", "cart": "[]" }
      }}
    }"#;

    #[test]
    fn parse_completed_event() {
        let event: StripeEvent = serde_json::from_str(COMPLETED_EVENT).unwrap();
        assert!(event.is_checkout_completed());
        let session = event.checkout_session().unwrap();
        assert_eq!(session.id, "cs_test_a1");
        assert_eq!(session.amount_total, Some(42000));
        assert_eq!(session.payer_email(), Some("ada@example.com"));
        assert_eq!(session.metadata_value("order_id"), Some("7"));
        assert_eq!(session.metadata_value("missing"), None);
    }

    #[test]
    fn null_metadata_is_accepted() {
        let json = r#"{"id":"cs_1","amount_total":100,"currency":"eur","metadata":null,"customer_details":null}"#;
        let session: CheckoutSessionObject = serde_json::from_str(json).unwrap();
        assert_eq!(session.metadata_value("cart"), None);
        assert_eq!(session.payer_email(), None);
    }

    #[test]
    fn form_params() {
        let session = NewCheckoutSession {
            amount_total: MinorUnits::from(42_000),
            currency: "eur".into(),
            product_name: "Custom watch".into(),
            origin: "https://shop.example/".into(),
            order_id: Some("12".into()),
            cart_metadata: Some(r#"[{"total":420}]"#.into()),
        };
        let params = session.to_form_params();
        let get = |k: &str| params.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("42000"));
        assert_eq!(get("success_url"), Some("https://shop.example/success.html?session_id={CHECKOUT_SESSION_ID}"));
        assert_eq!(get("cancel_url"), Some("https://shop.example/cancel.html"));
        assert_eq!(get("metadata[order_id]"), Some("12"));
        assert_eq!(get("metadata[cart]"), Some(r#"[{"total":420}]"#));
    }

    #[test]
    fn long_cart_survives_the_round_trip() {
        let item = r#"{"type":"Plongeuse","elements":{"carrure":"Acier 40mm","cadran":"Noir soleillé","aiguilles":"Dauphine","bracelet":"Cuir","fond":"Saphir","remontoir":"Acier"},"total":420.0,"image":"https://shop.example/img/plongeuse.png"}"#;
        let cart = format!("[{item},{item}]");
        assert!(cart.chars().count() > 500);
        let session = NewCheckoutSession { cart_metadata: Some(cart.clone()), ..Default::default() };
        let params = session.to_form_params();
        assert!(params.iter().all(|(k, _)| k != "metadata[cart]"));
        let metadata = params
            .iter()
            .filter_map(|(k, v)| {
                let key = k.strip_prefix("metadata[")?.strip_suffix(']')?;
                Some((key.to_string(), v.clone()))
            })
            .collect::<HashMap<String, String>>();
        assert_eq!(metadata.len(), 2);
        let completed = CheckoutSessionObject { id: "cs_1".into(), metadata: Some(metadata), ..Default::default() };
        assert_eq!(completed.joined_metadata_value("cart"), Some(cart));
    }
}
