//! Invoice service - monthly invoice generation and payment status.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{BillingPeriod, Device, Invoice, InvoiceStatus, ListScope, Money, PlanPricing, PlanType};

use crate::notify::Notifier;
use crate::repository::{
    DeviceRepository, InvoiceRepository, NewInvoice, OfficeRepository, UsageRepository,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Invoice service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// Generate the invoice of an active office for one month
    async fn generate(&self, office_id: Uuid, month: u32, year: i32) -> AppResult<Invoice>;

    /// Get an invoice by ID, including soft-deleted ones
    async fn get_invoice(&self, id: Uuid) -> AppResult<Invoice>;

    async fn list_invoices(&self, office_id: Option<Uuid>, scope: ListScope)
        -> AppResult<Vec<Invoice>>;

    /// unpaid -> paid
    async fn mark_paid(&self, id: Uuid) -> AppResult<Invoice>;

    /// paid -> unpaid
    async fn mark_unpaid(&self, id: Uuid) -> AppResult<Invoice>;
}

/// Concrete implementation of InvoiceService.
pub struct InvoiceManager {
    invoices: Arc<dyn InvoiceRepository>,
    offices: Arc<dyn OfficeRepository>,
    devices: Arc<dyn DeviceRepository>,
    usage: Arc<dyn UsageRepository>,
    pricing: PlanPricing,
    notifier: Notifier,
}

impl InvoiceManager {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        offices: Arc<dyn OfficeRepository>,
        devices: Arc<dyn DeviceRepository>,
        usage: Arc<dyn UsageRepository>,
        pricing: PlanPricing,
        notifier: Notifier,
    ) -> Self {
        Self {
            invoices,
            offices,
            devices,
            usage,
            pricing,
            notifier,
        }
    }

    /// Charge for one device over the period.
    async fn device_charge(&self, device: &Device, period: &BillingPeriod) -> AppResult<Money> {
        let sessions = match device.plan_type {
            PlanType::Monthly => 0,
            PlanType::PerSession => {
                self.usage
                    .count_for_device_between(device.id, period.first_day(), period.next_first_day())
                    .await?
            }
        };
        Ok(self.pricing.charge(device.plan_type, sessions))
    }

    async fn transition(&self, id: Uuid, next: InvoiceStatus) -> AppResult<Invoice> {
        let invoice = self.invoices.find_by_id(id).await?.ok_or_not_found("Invoice")?;
        invoice.status.transition_to(next)?;

        let updated = self.invoices.set_status(id, next).await?;
        tracing::info!(invoice_id = %id, status = %next, "Invoice status changed");
        Ok(updated)
    }
}

#[async_trait]
impl InvoiceService for InvoiceManager {
    async fn generate(&self, office_id: Uuid, month: u32, year: i32) -> AppResult<Invoice> {
        let period = BillingPeriod::new(month, year)?;

        let office = self
            .offices
            .find_by_id(office_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Office not found or deleted".to_string()))?;

        let month = period.month() as i32;
        if self
            .invoices
            .find_for_period(office_id, month, period.year())
            .await?
            .is_some()
        {
            return Err(AppError::constraint(format!(
                "An invoice for {:02}/{} already exists for this office",
                month,
                period.year()
            )));
        }

        let devices = self.devices.list(Some(office_id), ListScope::Active).await?;
        let mut total_amount = Money::ZERO;
        for device in &devices {
            total_amount += self.device_charge(device, &period).await?;
        }

        let invoice = self
            .invoices
            .create(NewInvoice {
                office_id,
                invoice_number: period.invoice_number(&office.npi_id),
                month,
                year: period.year(),
                total_amount,
            })
            .await?;

        tracing::info!(
            invoice_id = %invoice.id,
            office_id = %office_id,
            devices = devices.len(),
            total = %invoice.total_amount,
            "Invoice generated"
        );

        if let Some(email) = &office.email {
            self.notifier.invoice_ready(email, &office.name, &invoice);
        }

        Ok(invoice)
    }

    async fn get_invoice(&self, id: Uuid) -> AppResult<Invoice> {
        self.invoices
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("Invoice")
    }

    async fn list_invoices(
        &self,
        office_id: Option<Uuid>,
        scope: ListScope,
    ) -> AppResult<Vec<Invoice>> {
        self.invoices.list(office_id, scope).await
    }

    async fn mark_paid(&self, id: Uuid) -> AppResult<Invoice> {
        self.transition(id, InvoiceStatus::Paid).await
    }

    async fn mark_unpaid(&self, id: Uuid) -> AppResult<Invoice> {
        self.transition(id, InvoiceStatus::Unpaid).await
    }
}
