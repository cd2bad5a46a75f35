//! Development processor that never leaves the process.
//!
//! Intents are created in `requires_payment_method` and report `succeeded`
//! the first time they are read back, which lets the whole payment flow be
//! exercised without processor credentials.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use domain::{Money, PROCESSOR_STATUS_SUCCEEDED};

use super::{IntentMetadata, PaymentProcessor, ProcessorError, ProcessorIntent};

const STATUS_REQUIRES_PAYMENT_METHOD: &str = "requires_payment_method";

#[derive(Default)]
pub struct OfflineProcessor {
    intents: Mutex<HashMap<String, ProcessorIntent>>,
}

impl OfflineProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentProcessor for OfflineProcessor {
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<ProcessorIntent, ProcessorError> {
        let external_id = format!("pi_offline_{}", Uuid::new_v4().simple());
        let intent = ProcessorIntent {
            client_secret: Some(format!("{}_secret", external_id)),
            external_id: external_id.clone(),
            status: STATUS_REQUIRES_PAYMENT_METHOD.to_string(),
        };

        tracing::info!(
            %external_id,
            amount = %amount,
            currency,
            ?metadata,
            "Created offline payment intent"
        );

        self.intents.lock().await.insert(external_id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, external_id: &str) -> Result<ProcessorIntent, ProcessorError> {
        let mut intents = self.intents.lock().await;
        let intent = intents
            .get_mut(external_id)
            .ok_or_else(|| ProcessorError::UnknownIntent(external_id.to_string()))?;

        intent.status = PROCESSOR_STATUS_SUCCEEDED.to_string();
        Ok(intent.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_intent_succeeds_on_first_read() {
        let processor = OfflineProcessor::new();
        let created = processor
            .create_intent(Money::from_cents(1_500), "usd", IntentMetadata::new())
            .await
            .unwrap();
        assert_eq!(created.status, STATUS_REQUIRES_PAYMENT_METHOD);
        assert!(created.external_id.starts_with("pi_offline_"));

        let read = processor.retrieve_intent(&created.external_id).await.unwrap();
        assert_eq!(read.status, PROCESSOR_STATUS_SUCCEEDED);
    }

    #[tokio::test]
    async fn test_unknown_intent_is_reported() {
        let processor = OfflineProcessor::new();
        let err = processor.retrieve_intent("pi_missing").await.unwrap_err();
        assert!(matches!(err, ProcessorError::UnknownIntent(id) if id == "pi_missing"));
    }
}
