//! Payment processor collaborator.
//!
//! The billing core only ever reads the intent id, the client secret and
//! the status string. Everything else the processor returns is ignored.

mod offline;
mod stripe;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use common::AppError;
use domain::Money;

use crate::config::BillingConfig;

pub use offline::OfflineProcessor;
pub use stripe::StripeProcessor;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Processor-side view of a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorIntent {
    #[serde(rename = "id")]
    pub external_id: String,
    /// Handed to the browser to confirm the payment
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: String,
}

/// Metadata attached to an intent at creation.
pub type IntentMetadata = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Payment processor request failed: {0}")]
    Transport(String),

    #[error("Payment processor rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Payment intent {0} not found at the processor")]
    UnknownIntent(String),

    #[error("Unexpected payment processor response: {0}")]
    InvalidResponse(String),
}

impl From<ProcessorError> for AppError {
    fn from(err: ProcessorError) -> Self {
        AppError::payment_processor(err.to_string())
    }
}

/// Payment processor trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create an intent for `amount` in `currency`
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<ProcessorIntent, ProcessorError>;

    /// Read the current state of an intent
    async fn retrieve_intent(&self, external_id: &str) -> Result<ProcessorIntent, ProcessorError>;
}

/// Select the processor for the configuration: the HTTP adapter when a
/// secret key is configured, the offline one otherwise.
pub fn processor_from_config(config: &BillingConfig) -> Arc<dyn PaymentProcessor> {
    match &config.stripe_secret_key {
        Some(key) => Arc::new(StripeProcessor::new(config.stripe_api_base.clone(), key.clone())),
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set, payments run against the offline processor");
            Arc::new(OfflineProcessor::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processor_intent_reads_processor_payload() {
        let payload = serde_json::json!({
            "id": "pi_123",
            "object": "payment_intent",
            "amount": 29900,
            "client_secret": "pi_123_secret_abc",
            "status": "requires_payment_method"
        });

        let intent: ProcessorIntent = serde_json::from_value(payload).unwrap();
        assert_eq!(intent.external_id, "pi_123");
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
        assert_eq!(intent.status, "requires_payment_method");
    }

    #[test]
    fn test_processor_error_maps_to_bad_gateway() {
        let err: AppError = ProcessorError::Transport("timeout".to_string()).into();
        assert_eq!(err.code(), "PAYMENT_PROCESSOR_ERROR");
        assert_eq!(err.status().as_u16(), 502);
    }
}
