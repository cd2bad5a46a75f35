//! Derived financial status of offices.
//!
//! Nothing here is persisted. Status is computed on every read from the
//! office's non-deleted invoices.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::OVERDUE_AFTER_DAYS;
use crate::device::PlanType;
use crate::invoice::InvoiceStatus;
use crate::money::Money;

/// Payment status of an office as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum OfficePaymentStatus {
    Overdue,
    Pending,
    Partial,
    NoInvoices,
    Paid,
}

impl OfficePaymentStatus {
    /// Dashboard ordering, most urgent first.
    pub fn priority(&self) -> u8 {
        match self {
            OfficePaymentStatus::Overdue => 0,
            OfficePaymentStatus::Pending => 1,
            OfficePaymentStatus::Partial => 2,
            OfficePaymentStatus::NoInvoices => 3,
            OfficePaymentStatus::Paid => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OfficePaymentStatus::Overdue => "overdue",
            OfficePaymentStatus::Pending => "pending",
            OfficePaymentStatus::Partial => "partial",
            OfficePaymentStatus::NoInvoices => "no_invoices",
            OfficePaymentStatus::Paid => "paid",
        }
    }
}

impl PartialOrd for OfficePaymentStatus {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OfficePaymentStatus {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl std::fmt::Display for OfficePaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slice of an invoice the status derivation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceFigures {
    pub amount: Money,
    pub status: InvoiceStatus,
    pub generated_at: DateTime<Utc>,
}

/// Financial summary of one office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OfficeFinancials {
    pub total_amount: Money,
    pub paid_amount: Money,
    pub unpaid_amount: Money,
    pub status: OfficePaymentStatus,
    pub invoice_count: usize,
}

/// Summarize an office's non-deleted invoices as of `now`.
pub fn summarize_invoices(invoices: &[InvoiceFigures], now: DateTime<Utc>) -> OfficeFinancials {
    let total_amount: Money = invoices.iter().map(|i| i.amount).sum();
    let paid_amount: Money = invoices
        .iter()
        .filter(|i| i.status.is_paid())
        .map(|i| i.amount)
        .sum();

    let status = if invoices.is_empty() {
        OfficePaymentStatus::NoInvoices
    } else if paid_amount == total_amount {
        OfficePaymentStatus::Paid
    } else if paid_amount.is_positive() {
        OfficePaymentStatus::Partial
    } else {
        let cutoff = now - Duration::days(OVERDUE_AFTER_DAYS);
        let overdue = invoices
            .iter()
            .any(|i| !i.status.is_paid() && i.generated_at < cutoff);
        if overdue {
            OfficePaymentStatus::Overdue
        } else {
            OfficePaymentStatus::Pending
        }
    };

    OfficeFinancials {
        total_amount,
        paid_amount,
        unpaid_amount: total_amount - paid_amount,
        status,
        invoice_count: invoices.len(),
    }
}

/// Totals across a set of offices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GlobalTotals {
    pub total_owed: Money,
    pub total_paid: Money,
}

impl GlobalTotals {
    pub fn accumulate(&mut self, office: &OfficeFinancials) {
        self.total_owed += office.total_amount - office.paid_amount;
        self.total_paid += office.paid_amount;
    }
}

impl<'a> FromIterator<&'a OfficeFinancials> for GlobalTotals {
    fn from_iter<I: IntoIterator<Item = &'a OfficeFinancials>>(iter: I) -> Self {
        let mut totals = GlobalTotals::default();
        for office in iter {
            totals.accumulate(office);
        }
        totals
    }
}

/// Prices charged per device plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPricing {
    pub monthly_fee: Money,
    pub session_fee: Money,
}

impl PlanPricing {
    /// Charge for one device over one billing month.
    pub fn charge(&self, plan: PlanType, sessions: u64) -> Money {
        match plan {
            PlanType::Monthly => self.monthly_fee,
            PlanType::PerSession => self.session_fee.times(sessions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(cents: i64, status: InvoiceStatus, age_days: i64, now: DateTime<Utc>) -> InvoiceFigures {
        InvoiceFigures {
            amount: Money::from_cents(cents),
            status,
            generated_at: now - Duration::days(age_days),
        }
    }

    #[test]
    fn test_no_invoices() {
        let summary = summarize_invoices(&[], Utc::now());
        assert_eq!(summary.status, OfficePaymentStatus::NoInvoices);
        assert_eq!(summary.total_amount, Money::ZERO);
        assert_eq!(summary.invoice_count, 0);
    }

    #[test]
    fn test_partial_payment() {
        let now = Utc::now();
        let summary = summarize_invoices(
            &[
                invoice(10_000, InvoiceStatus::Paid, 5, now),
                invoice(5_000, InvoiceStatus::Unpaid, 5, now),
            ],
            now,
        );

        assert_eq!(summary.total_amount, Money::from_cents(15_000));
        assert_eq!(summary.paid_amount, Money::from_cents(10_000));
        assert_eq!(summary.unpaid_amount, Money::from_cents(5_000));
        assert_eq!(summary.status, OfficePaymentStatus::Partial);
        assert_eq!(summary.invoice_count, 2);
    }

    #[test]
    fn test_fully_paid_is_exact() {
        let now = Utc::now();
        let summary = summarize_invoices(
            &[
                invoice(3_333, InvoiceStatus::Paid, 40, now),
                invoice(6_667, InvoiceStatus::Paid, 2, now),
            ],
            now,
        );
        assert_eq!(summary.status, OfficePaymentStatus::Paid);
        assert_eq!(summary.unpaid_amount, Money::ZERO);
    }

    #[test]
    fn test_overdue_after_thirty_days() {
        let now = Utc::now();
        let overdue = summarize_invoices(&[invoice(5_000, InvoiceStatus::Unpaid, 31, now)], now);
        assert_eq!(overdue.status, OfficePaymentStatus::Overdue);

        let pending = summarize_invoices(&[invoice(5_000, InvoiceStatus::Unpaid, 29, now)], now);
        assert_eq!(pending.status, OfficePaymentStatus::Pending);
    }

    #[test]
    fn test_zero_amount_invoices_count_as_paid() {
        let now = Utc::now();
        let summary = summarize_invoices(&[invoice(0, InvoiceStatus::Unpaid, 90, now)], now);
        assert_eq!(summary.status, OfficePaymentStatus::Paid);
    }

    #[test]
    fn test_priority_ordering() {
        let mut statuses = vec![
            OfficePaymentStatus::Paid,
            OfficePaymentStatus::NoInvoices,
            OfficePaymentStatus::Overdue,
            OfficePaymentStatus::Partial,
            OfficePaymentStatus::Pending,
        ];
        statuses.sort();
        assert_eq!(
            statuses,
            vec![
                OfficePaymentStatus::Overdue,
                OfficePaymentStatus::Pending,
                OfficePaymentStatus::Partial,
                OfficePaymentStatus::NoInvoices,
                OfficePaymentStatus::Paid,
            ]
        );
    }

    #[test]
    fn test_global_totals() {
        let now = Utc::now();
        let a = summarize_invoices(
            &[
                invoice(10_000, InvoiceStatus::Paid, 1, now),
                invoice(5_000, InvoiceStatus::Unpaid, 1, now),
            ],
            now,
        );
        let b = summarize_invoices(&[invoice(2_500, InvoiceStatus::Unpaid, 1, now)], now);

        let totals: GlobalTotals = [a, b].iter().collect();
        assert_eq!(totals.total_owed, Money::from_cents(7_500));
        assert_eq!(totals.total_paid, Money::from_cents(10_000));
    }

    #[test]
    fn test_plan_pricing() {
        let pricing = PlanPricing {
            monthly_fee: Money::from_cents(29_900),
            session_fee: Money::from_cents(1_500),
        };
        assert_eq!(pricing.charge(PlanType::Monthly, 100), Money::from_cents(29_900));
        assert_eq!(pricing.charge(PlanType::PerSession, 4), Money::from_cents(6_000));
        assert_eq!(pricing.charge(PlanType::PerSession, 0), Money::ZERO);
    }
}
