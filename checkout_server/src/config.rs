use std::env;

use checkout_engine::helpers::{PricingPolicy, DEFAULT_CURRENCY, DEFAULT_MAX_ITEM_TOTAL};
use cpg_common::{
    helpers::{parse_boolean_flag, split_list},
    Secret,
};
use log::*;
use stripe_tools::{webhook::DEFAULT_TOLERANCE_SECS, StripeConfig};

const DEFAULT_CPG_HOST: &str = "127.0.0.1";
const DEFAULT_CPG_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/checkout_orders.db";
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";
const DEFAULT_BRAND_NAME: &str = "KairoMod";
const DEFAULT_BRAND_LOGO_URL: &str = "https://kairomod.fr/images/logo.png";
const DEFAULT_EMAIL_FROM: &str = "KairoMod <contact@kairomod.fr>";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub pricing: PricingPolicy,
    pub stripe: StripeConfig,
    pub webhook: WebhookConfig,
    pub notifications: NotificationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPG_HOST.to_string(),
            port: DEFAULT_CPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pricing: PricingPolicy::default(),
            stripe: StripeConfig::default(),
            webhook: WebhookConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("CPG_HOST").ok().unwrap_or_else(|| DEFAULT_CPG_HOST.into());
        let port = env::var("CPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CPG_PORT. {e} Using the default, {DEFAULT_CPG_PORT}, instead."
                    );
                    DEFAULT_CPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPG_PORT);
        let database_url = env::var("CPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CPG_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let pricing = pricing_from_env();
        let stripe = StripeConfig::new_from_env_or_default();
        let webhook = WebhookConfig::from_env_or_default();
        let notifications = NotificationConfig::from_env_or_default();
        Self { host, port, database_url, pricing, stripe, webhook, notifications }
    }
}

fn pricing_from_env() -> PricingPolicy {
    let currency = env::var("CPG_CURRENCY").ok().filter(|s| s.trim().len() == 3).unwrap_or_else(|| {
        info!("🪛️ CPG_CURRENCY is not set or invalid. Using '{DEFAULT_CURRENCY}'.");
        DEFAULT_CURRENCY.to_string()
    });
    let max_item_total = env::var("CPG_MAX_ITEM_TOTAL")
        .map_err(|_| info!("🪛️ CPG_MAX_ITEM_TOTAL is not set. Using the default value of {DEFAULT_MAX_ITEM_TOTAL}."))
        .and_then(|s| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(|| warn!("🪛️ Invalid configuration value for CPG_MAX_ITEM_TOTAL: {s}"))
        })
        .unwrap_or(DEFAULT_MAX_ITEM_TOTAL);
    PricingPolicy::new(max_item_total, currency.trim())
}

//-------------------------------------------------  WebhookConfig  ----------------------------------------------------
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// The endpoint signing secret (`whsec_...`) from the Stripe dashboard
    pub signing_secret: Secret<String>,
    /// Maximum age of a signature, in seconds. Zero disables the check.
    pub tolerance_secs: i64,
    /// If false, incoming webhook calls are not authenticated. **DANGER**
    pub signature_checks: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self { signing_secret: Secret::default(), tolerance_secs: DEFAULT_TOLERANCE_SECS, signature_checks: true }
    }
}

impl WebhookConfig {
    pub fn from_env_or_default() -> Self {
        let signing_secret = Secret::new(env::var("CPG_STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
            error!(
                "🪛️ CPG_STRIPE_WEBHOOK_SECRET is not set. Every webhook call will be rejected until it is set to the \
                 endpoint's signing secret."
            );
            String::default()
        }));
        let tolerance_secs = env::var("CPG_STRIPE_SIGNATURE_TOLERANCE")
            .map_err(|_| debug!("🪛️ CPG_STRIPE_SIGNATURE_TOLERANCE is not set. Using {DEFAULT_TOLERANCE_SECS}s."))
            .and_then(|s| {
                s.parse::<i64>()
                    .ok()
                    .filter(|v| *v >= 0)
                    .ok_or_else(|| warn!("🪛️ Invalid configuration value for CPG_STRIPE_SIGNATURE_TOLERANCE: {s}"))
            })
            .unwrap_or(DEFAULT_TOLERANCE_SECS);
        let signature_checks = parse_boolean_flag(env::var("CPG_STRIPE_SIGNATURE_CHECKS").ok(), true);
        if !signature_checks {
            warn!("🚨️ Webhook signature checks are DISABLED. Anyone can mark orders as paid. 🚨️");
        }
        Self { signing_secret, tolerance_secs, signature_checks }
    }
}

//-----------------------------------------------  NotificationConfig  -------------------------------------------------
#[derive(Clone, Debug)]
pub struct NotificationConfig {
    /// If empty, notifications are written to the log instead of being emailed
    pub resend_api_key: Secret<String>,
    pub resend_api_url: String,
    pub from: String,
    /// Operator mailboxes that receive a summary of every paid order
    pub to: Vec<String>,
    pub brand: BrandConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrandConfig {
    pub name: String,
    pub logo_url: Option<String>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self { name: DEFAULT_BRAND_NAME.to_string(), logo_url: Some(DEFAULT_BRAND_LOGO_URL.to_string()) }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            resend_api_key: Secret::default(),
            resend_api_url: DEFAULT_RESEND_API_URL.to_string(),
            from: DEFAULT_EMAIL_FROM.to_string(),
            to: Vec::new(),
            brand: BrandConfig::default(),
        }
    }
}

impl NotificationConfig {
    pub fn from_env_or_default() -> Self {
        let resend_api_key = Secret::new(env::var("CPG_RESEND_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ CPG_RESEND_API_KEY is not set. Paid-order notifications will only be logged.");
            String::default()
        }));
        let resend_api_url = env::var("CPG_RESEND_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_RESEND_API_URL.to_string());
        let from = env::var("CPG_EMAIL_FROM").unwrap_or_else(|_| {
            info!("🪛️ CPG_EMAIL_FROM is not set. Using '{DEFAULT_EMAIL_FROM}'.");
            DEFAULT_EMAIL_FROM.to_string()
        });
        let to = env::var("CPG_EMAIL_TO").map(|s| split_list(&s)).unwrap_or_default();
        if to.is_empty() {
            warn!("🪛️ CPG_EMAIL_TO is not set. Nobody will be notified of paid orders.");
        } else {
            info!("🪛️ Paid-order notifications go to {}", to.join(", "));
        }
        let name = env::var("CPG_BRAND_NAME").unwrap_or_else(|_| DEFAULT_BRAND_NAME.to_string());
        let logo_url = match env::var("CPG_BRAND_LOGO_URL") {
            Ok(s) if ["", "none", "false", "0"].contains(&s.trim().to_lowercase().as_str()) => None,
            Ok(s) => Some(s),
            Err(_) => Some(DEFAULT_BRAND_LOGO_URL.to_string()),
        };
        Self { resend_api_key, resend_api_url, from, to, brand: BrandConfig { name, logo_url } }
    }

    pub fn email_enabled(&self) -> bool {
        !self.resend_api_key.is_empty()
    }
}
