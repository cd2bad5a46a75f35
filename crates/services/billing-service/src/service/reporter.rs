//! Aggregation reporter - derived financial status of offices.
//!
//! Nothing here is stored: every figure is computed from the current
//! non-deleted invoices at read time.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::{summarize_invoices, GlobalTotals, InvoiceFigures, ListScope, OfficeFinancials};

use crate::repository::{InvoiceRepository, OfficeRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// One office row on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OfficeSummary {
    pub office_id: Uuid,
    pub name: String,
    pub npi_id: String,
    pub financials: OfficeFinancials,
}

/// Every active office, most urgent first, with the global totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Dashboard {
    pub offices: Vec<OfficeSummary>,
    pub totals: GlobalTotals,
}

/// Reporter trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Financial status of one office
    async fn office_status(&self, office_id: Uuid) -> AppResult<OfficeFinancials>;

    /// Owed and paid totals across the given offices
    async fn global_totals(&self, office_ids: &[Uuid]) -> AppResult<GlobalTotals>;

    async fn dashboard(&self) -> AppResult<Dashboard>;
}

/// Concrete implementation of Reporter.
pub struct BillingReporter {
    offices: Arc<dyn OfficeRepository>,
    invoices: Arc<dyn InvoiceRepository>,
}

impl BillingReporter {
    pub fn new(offices: Arc<dyn OfficeRepository>, invoices: Arc<dyn InvoiceRepository>) -> Self {
        Self { offices, invoices }
    }

    /// Financials of every listed office, offices without invoices included.
    async fn financials_by_office(
        &self,
        office_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, OfficeFinancials>> {
        let mut grouped: HashMap<Uuid, Vec<InvoiceFigures>> =
            office_ids.iter().map(|id| (*id, Vec::new())).collect();
        for (office_id, figures) in self.invoices.figures_for_offices(office_ids).await? {
            grouped.entry(office_id).or_default().push(figures);
        }

        let now = Utc::now();
        Ok(grouped
            .into_iter()
            .map(|(id, figures)| (id, summarize_invoices(&figures, now)))
            .collect())
    }
}

#[async_trait]
impl Reporter for BillingReporter {
    async fn office_status(&self, office_id: Uuid) -> AppResult<OfficeFinancials> {
        self.offices
            .find_by_id_with_deleted(office_id)
            .await?
            .ok_or_not_found("Office")?;

        let figures: Vec<InvoiceFigures> = self
            .invoices
            .figures_for_offices(&[office_id])
            .await?
            .into_iter()
            .map(|(_, figures)| figures)
            .collect();

        Ok(summarize_invoices(&figures, Utc::now()))
    }

    async fn global_totals(&self, office_ids: &[Uuid]) -> AppResult<GlobalTotals> {
        let financials = self.financials_by_office(office_ids).await?;
        Ok(financials.values().collect())
    }

    async fn dashboard(&self) -> AppResult<Dashboard> {
        let offices = self.offices.list(ListScope::Active).await?;
        let ids: Vec<Uuid> = offices.iter().map(|o| o.id).collect();
        let mut financials = self.financials_by_office(&ids).await?;

        let mut rows: Vec<OfficeSummary> = offices
            .into_iter()
            .map(|office| OfficeSummary {
                financials: financials
                    .remove(&office.id)
                    .unwrap_or_else(|| summarize_invoices(&[], Utc::now())),
                office_id: office.id,
                name: office.name,
                npi_id: office.npi_id,
            })
            .collect();
        rows.sort_by(|a, b| {
            a.financials
                .status
                .cmp(&b.financials.status)
                .then_with(|| a.name.cmp(&b.name))
        });

        let totals = rows.iter().map(|row| &row.financials).collect();
        Ok(Dashboard {
            offices: rows,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockInvoiceRepository, MockOfficeRepository};
    use chrono::Duration;
    use domain::{InvoiceStatus, Money, Office, OfficePaymentStatus};

    fn office(name: &str) -> Office {
        Office {
            id: Uuid::new_v4(),
            name: name.to_string(),
            npi_id: "1234567890".to_string(),
            state: "CA".to_string(),
            town: "Fresno".to_string(),
            address: "1 Main St".to_string(),
            phone: None,
            email: None,
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn figures(cents: i64, status: InvoiceStatus, age_days: i64) -> InvoiceFigures {
        InvoiceFigures {
            amount: Money::from_cents(cents),
            status,
            generated_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn test_office_status_partial() {
        let mut offices = MockOfficeRepository::new();
        offices.expect_find_by_id_with_deleted()
            .returning(|_| Ok(Some(office("Bright Smiles"))));
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_figures_for_offices().returning(|ids| {
            Ok(vec![
                (ids[0], figures(10_000, InvoiceStatus::Paid, 5)),
                (ids[0], figures(5_000, InvoiceStatus::Unpaid, 5)),
            ])
        });

        let reporter = BillingReporter::new(Arc::new(offices), Arc::new(invoices));
        let status = reporter.office_status(Uuid::new_v4()).await.unwrap();

        assert_eq!(status.total_amount, Money::from_cents(15_000));
        assert_eq!(status.paid_amount, Money::from_cents(10_000));
        assert_eq!(status.unpaid_amount, Money::from_cents(5_000));
        assert_eq!(status.status, OfficePaymentStatus::Partial);
    }

    #[tokio::test]
    async fn test_dashboard_orders_by_priority_then_name() {
        let paid = office("Alpha Dental");
        let overdue = office("Zeta Dental");
        let empty_b = office("Beta Dental");
        let empty_a = office("Acme Dental");
        let listed = vec![paid.clone(), overdue.clone(), empty_b.clone(), empty_a.clone()];
        let (paid_id, overdue_id) = (paid.id, overdue.id);

        let mut offices = MockOfficeRepository::new();
        offices.expect_list().returning(move |_| Ok(listed.clone()));
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_figures_for_offices().returning(move |_| {
            Ok(vec![
                (paid_id, figures(20_000, InvoiceStatus::Paid, 40)),
                (overdue_id, figures(7_500, InvoiceStatus::Unpaid, 31)),
            ])
        });

        let reporter = BillingReporter::new(Arc::new(offices), Arc::new(invoices));
        let dashboard = reporter.dashboard().await.unwrap();

        let names: Vec<_> = dashboard.offices.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta Dental", "Acme Dental", "Beta Dental", "Alpha Dental"]);
        assert_eq!(dashboard.totals.total_owed, Money::from_cents(7_500));
        assert_eq!(dashboard.totals.total_paid, Money::from_cents(20_000));
    }

    #[tokio::test]
    async fn test_global_totals_sums_unpaid_remainders() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_figures_for_offices().returning(move |_| {
            Ok(vec![
                (a, figures(10_000, InvoiceStatus::Paid, 1)),
                (a, figures(2_500, InvoiceStatus::Unpaid, 1)),
                (b, figures(4_000, InvoiceStatus::Unpaid, 45)),
            ])
        });

        let reporter = BillingReporter::new(Arc::new(MockOfficeRepository::new()), Arc::new(invoices));
        let totals = reporter.global_totals(&[a, b]).await.unwrap();

        assert_eq!(totals.total_owed, Money::from_cents(6_500));
        assert_eq!(totals.total_paid, Money::from_cents(10_000));
    }
}
