//! Stripe adapter over its form-encoded HTTP API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use domain::Money;

use super::{IntentMetadata, PaymentProcessor, ProcessorError, ProcessorIntent};

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct StripeProcessor {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeProcessor {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }

    fn intents_url(&self) -> String {
        format!("{}/payment_intents", self.api_base)
    }

    async fn read_intent(
        response: reqwest::Response,
        external_id: Option<&str>,
    ) -> Result<ProcessorIntent, ProcessorError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<ProcessorIntent>()
                .await
                .map_err(|e| ProcessorError::InvalidResponse(e.to_string()));
        }

        if let (StatusCode::NOT_FOUND, Some(id)) = (status, external_id) {
            return Err(ProcessorError::UnknownIntent(id.to_string()));
        }

        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.error.message.unwrap_or_default(),
            Err(e) => e.to_string(),
        };
        Err(ProcessorError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Form fields for an intent creation request.
fn create_form(amount: Money, currency: &str, metadata: &IntentMetadata) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), amount.cents().to_string()),
        ("currency".to_string(), currency.to_string()),
        ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
    ];
    form.extend(
        metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{}]", key), value.clone())),
    );
    form
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<ProcessorIntent, ProcessorError> {
        let response = self
            .client
            .post(self.intents_url())
            .bearer_auth(&self.secret_key)
            .form(&create_form(amount, currency, &metadata))
            .send()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        let intent = Self::read_intent(response, None).await?;
        tracing::info!(external_id = %intent.external_id, amount = %amount, "Created payment intent");
        Ok(intent)
    }

    async fn retrieve_intent(&self, external_id: &str) -> Result<ProcessorIntent, ProcessorError> {
        let response = self
            .client
            .get(format!("{}/{}", self.intents_url(), external_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        Self::read_intent(response, Some(external_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_form_flattens_metadata() {
        let mut metadata = IntentMetadata::new();
        metadata.insert("invoice_id".to_string(), "abc".to_string());

        let form = create_form(Money::from_cents(29_900), "usd", &metadata);

        assert!(form.contains(&("amount".to_string(), "29900".to_string())));
        assert!(form.contains(&("currency".to_string(), "usd".to_string())));
        assert!(form.contains(&("metadata[invoice_id]".to_string(), "abc".to_string())));
    }

    #[test]
    fn test_api_base_trailing_slash_is_trimmed() {
        let processor = StripeProcessor::new("https://api.example.test/v1/", "sk_test");
        assert_eq!(processor.intents_url(), "https://api.example.test/v1/payment_intents");
    }
}
