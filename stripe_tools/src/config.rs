use log::*;
use cpg_common::Secret;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
pub const DEFAULT_PRODUCT_NAME: &str = "Custom watch";

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    /// Base URL of the Stripe REST API. Only overridden in tests.
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// The product name shown on the hosted checkout page.
    pub product_name: String,
}

impl StripeConfig {
    pub fn new(api_url: &str, secret_key: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key: Secret::new(secret_key.to_string()),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
        }
    }

    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("CPG_STRIPE_API_URL").unwrap_or_else(|_| {
            debug!("CPG_STRIPE_API_URL not set, using {DEFAULT_STRIPE_API_URL}");
            DEFAULT_STRIPE_API_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("CPG_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("CPG_STRIPE_SECRET_KEY not set, using (probably useless) default");
            "sk_test_00000000000000".to_string()
        }));
        let product_name = std::env::var("CPG_STRIPE_PRODUCT_NAME").unwrap_or_else(|_| {
            info!("CPG_STRIPE_PRODUCT_NAME not set, using '{DEFAULT_PRODUCT_NAME}' as default");
            DEFAULT_PRODUCT_NAME.to_string()
        });
        Self { api_url: api_url.trim_end_matches('/').to_string(), secret_key, product_name }
    }
}
