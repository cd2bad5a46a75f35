//! Outgoing e-mail.
//!
//! Sending is fire-and-forget: messages go out on a detached task and a
//! failure is logged, never returned to the operation that triggered it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use domain::{Invoice, PaymentIntent};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A single outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
#[error("Mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Mail transport.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// Transport that writes messages to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            "=== EMAIL (not sent) ===\n{}",
            email.body
        );
        Ok(())
    }
}

/// Builds the billing e-mails and dispatches them in the background.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    app_url: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>, app_url: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Notifier that only logs, for development and tests.
    pub fn logging() -> Self {
        Self::new(Arc::new(LogMailer), "billing@lune.local", "http://localhost")
    }

    /// Tell an office its monthly invoice is ready.
    pub fn invoice_ready(&self, to: &str, office_name: &str, invoice: &Invoice) {
        let subject = format!("Your Lune invoice {} is ready", invoice.invoice_number);
        let body = format!(
            "Hello {office_name},\n\n\
             Invoice {number} for {month:02}/{year} totals ${amount}.\n\
             Pay online: {url}/pay/{id}\n",
            number = invoice.invoice_number,
            month = invoice.month,
            year = invoice.year,
            amount = invoice.total_amount,
            url = self.app_url,
            id = invoice.id,
        );
        self.dispatch(to, subject, body);
    }

    /// Confirm that a payment was captured.
    pub fn payment_received(&self, to: &str, invoice_number: &str, intent: &PaymentIntent) {
        let subject = format!("Payment received for invoice {}", invoice_number);
        let body = format!(
            "We received your payment of ${} {} for invoice {}.\nReference: {}\n",
            intent.amount,
            intent.currency.to_uppercase(),
            invoice_number,
            intent.external_intent_id,
        );
        self.dispatch(to, subject, body);
    }

    /// Send a password reset link.
    pub fn password_reset(&self, to: &str, token: &str, ttl_minutes: i64) {
        let subject = "Reset your Lune billing password".to_string();
        let body = format!(
            "Use the link below to choose a new password. It expires in {} minutes.\n\
             {}/reset-password?token={}\n",
            ttl_minutes, self.app_url, token
        );
        self.dispatch(to, subject, body);
    }

    fn dispatch(&self, to: &str, subject: String, body: String) {
        let email = Email {
            to: to.to_string(),
            from: self.from.clone(),
            subject,
            body,
        };
        let mailer = self.mailer.clone();

        tokio::spawn(async move {
            let to = email.to.clone();
            if let Err(e) = mailer.send(email).await {
                tracing::error!(%to, error = %e, "Failed to send e-mail");
            }
        });
    }
}
