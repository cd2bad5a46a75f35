//! Billing service configuration.

use common::{env_opt, env_or, env_parse, DatabaseConfig};
use domain::{Money, PlanPricing, DEFAULT_CURRENCY};

/// Default flat fee for a monthly plan device, in cents
const DEFAULT_MONTHLY_FEE_CENTS: i64 = 29_900;

/// Default fee per recorded session, in cents
const DEFAULT_SESSION_FEE_CENTS: i64 = 1_500;

const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Billing service configuration.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub database: DatabaseConfig,
    /// Flat fee per device on the monthly plan, in cents
    pub monthly_fee_cents: i64,
    /// Fee per session for devices on the per-session plan, in cents
    pub session_fee_cents: i64,
    /// ISO 4217 currency passed to the payment processor
    pub currency: String,
    /// Payment processor secret key; unset selects the offline processor
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    /// Sender address for outgoing e-mail
    pub mail_from: String,
    /// Base URL of the web app, used in e-mail links
    pub public_app_url: String,
}

impl BillingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database: DatabaseConfig::from_env(),
            monthly_fee_cents: env_parse("PLAN_MONTHLY_FEE_CENTS", defaults.monthly_fee_cents),
            session_fee_cents: env_parse("PLAN_SESSION_FEE_CENTS", defaults.session_fee_cents),
            currency: env_or("BILLING_CURRENCY", &defaults.currency).to_lowercase(),
            stripe_secret_key: env_opt("STRIPE_SECRET_KEY"),
            stripe_api_base: env_or("STRIPE_API_BASE", &defaults.stripe_api_base),
            mail_from: env_or("MAIL_FROM", &defaults.mail_from),
            public_app_url: env_or("PUBLIC_APP_URL", &defaults.public_app_url),
        }
    }

    pub fn pricing(&self) -> PlanPricing {
        PlanPricing {
            monthly_fee: Money::from_cents(self.monthly_fee_cents),
            session_fee: Money::from_cents(self.session_fee_cents),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            monthly_fee_cents: DEFAULT_MONTHLY_FEE_CENTS,
            session_fee_cents: DEFAULT_SESSION_FEE_CENTS,
            currency: DEFAULT_CURRENCY.to_string(),
            stripe_secret_key: None,
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            mail_from: "billing@lune.local".to_string(),
            public_app_url: "http://localhost:5173".to_string(),
        }
    }
}
