//! Payment service - processor intents for invoices.
//!
//! Intents are created at the processor first and recorded afterwards.
//! Refreshing an intent stores the processor status and, once the payment
//! has succeeded, marks the invoice paid in the same transaction.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{Invoice, InvoiceStatus, PaymentIntent, PROCESSOR_STATUS_SUCCEEDED};

use crate::infra::Persistence;
use crate::notify::Notifier;
use crate::payment::{IntentMetadata, PaymentProcessor};
use crate::repository::{
    set_invoice_status, set_payment_status, InvoiceRepository, NewPaymentIntent,
    OfficeRepository, PaymentRepository,
};
use crate::with_transaction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A recorded intent plus the secret the browser needs to confirm it.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PaymentCheckout {
    pub intent: PaymentIntent,
    pub client_secret: Option<String>,
}

/// Payment service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Open an intent for the full amount of an active, unpaid invoice.
    /// `user_id` is `None` for public payment links.
    async fn create_for_invoice(
        &self,
        invoice_id: Uuid,
        user_id: Option<Uuid>,
    ) -> AppResult<PaymentCheckout>;

    /// Pull the processor state of an intent and apply it
    async fn refresh(&self, external_intent_id: &str) -> AppResult<PaymentIntent>;
}

/// Concrete implementation of PaymentService.
pub struct PaymentManager {
    persistence: Persistence,
    payments: Arc<dyn PaymentRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    offices: Arc<dyn OfficeRepository>,
    processor: Arc<dyn PaymentProcessor>,
    notifier: Notifier,
    currency: String,
}

impl PaymentManager {
    pub fn new(
        persistence: Persistence,
        payments: Arc<dyn PaymentRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        offices: Arc<dyn OfficeRepository>,
        processor: Arc<dyn PaymentProcessor>,
        notifier: Notifier,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            persistence,
            payments,
            invoices,
            offices,
            processor,
            notifier,
            currency: currency.into(),
        }
    }

    async fn notify_paid(&self, invoice: &Invoice, intent: &PaymentIntent) {
        match self.offices.find_by_id_with_deleted(invoice.office_id).await {
            Ok(Some(office)) => {
                if let Some(email) = &office.email {
                    self.notifier
                        .payment_received(email, &invoice.invoice_number, intent);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "Failed to load office for payment receipt"),
        }
    }
}

fn intent_metadata(invoice: &Invoice) -> IntentMetadata {
    let mut metadata = IntentMetadata::new();
    metadata.insert("invoice_id".to_string(), invoice.id.to_string());
    metadata.insert("invoice_number".to_string(), invoice.invoice_number.clone());
    metadata.insert("office_id".to_string(), invoice.office_id.to_string());
    metadata
}

#[async_trait]
impl PaymentService for PaymentManager {
    async fn create_for_invoice(
        &self,
        invoice_id: Uuid,
        user_id: Option<Uuid>,
    ) -> AppResult<PaymentCheckout> {
        let invoice = self
            .invoices
            .find_by_id(invoice_id)
            .await?
            .ok_or_not_found("Invoice")?;

        if invoice.status.is_paid() {
            return Err(AppError::invalid_transition("Invoice is already paid"));
        }
        if !invoice.total_amount.is_positive() {
            return Err(AppError::validation("Invoice has no amount due"));
        }

        let remote = self
            .processor
            .create_intent(invoice.total_amount, &self.currency, intent_metadata(&invoice))
            .await?;

        let intent = self
            .payments
            .create(NewPaymentIntent {
                external_intent_id: remote.external_id,
                invoice_id: invoice.id,
                office_id: invoice.office_id,
                user_id,
                amount: invoice.total_amount,
                currency: self.currency.clone(),
                status: remote.status,
            })
            .await?;

        tracing::info!(
            invoice_id = %invoice.id,
            external_id = %intent.external_intent_id,
            public = user_id.is_none(),
            "Payment intent opened"
        );

        Ok(PaymentCheckout {
            intent,
            client_secret: remote.client_secret,
        })
    }

    async fn refresh(&self, external_intent_id: &str) -> AppResult<PaymentIntent> {
        let stored = self
            .payments
            .find_by_external_id(external_intent_id)
            .await?
            .ok_or_not_found("Payment intent")?;

        let remote = self.processor.retrieve_intent(external_intent_id).await?;

        let invoice = self.invoices.find_by_id(stored.invoice_id).await?;
        let settle = remote.status == PROCESSOR_STATUS_SUCCEEDED
            && invoice
                .as_ref()
                .is_some_and(|i| i.status == InvoiceStatus::Unpaid);

        let external_id = external_intent_id.to_string();
        let status = remote.status.clone();
        let invoice_id = stored.invoice_id;
        let intent = with_transaction!(self.persistence, |ctx| {
            let intent = set_payment_status(ctx.conn(), &external_id, &status).await?;
            if settle {
                set_invoice_status(ctx.conn(), invoice_id, InvoiceStatus::Paid).await?;
            }
            Ok(intent)
        })?;

        tracing::info!(
            external_id = %intent.external_intent_id,
            status = %intent.status,
            invoice_paid = settle,
            "Payment intent refreshed"
        );

        if let (true, Some(invoice)) = (settle, invoice.as_ref()) {
            self.notify_paid(invoice, &intent).await;
        }

        Ok(intent)
    }
}
