//! Invoice entity, status transitions and billing periods.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{INVOICE_NUMBER_PREFIX, MAX_INVOICE_YEAR, MIN_INVOICE_YEAR};
use crate::error::{DomainError, DomainResult};
use crate::lifecycle::LifecycleState;
use crate::money::Money;

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }

    /// Validate a status change. Only `unpaid -> paid` and `paid -> unpaid`
    /// are allowed.
    pub fn transition_to(self, next: InvoiceStatus) -> DomainResult<InvoiceStatus> {
        if self == next {
            return Err(DomainError::invalid_transition(format!(
                "Invoice is already {}",
                self.as_str()
            )));
        }
        Ok(next)
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(DomainError::validation(format!(
                "Unknown invoice status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated calendar month an invoice covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    month: u32,
    year: i32,
}

impl BillingPeriod {
    pub fn new(month: u32, year: i32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation("Month must be between 1 and 12"));
        }
        if !(MIN_INVOICE_YEAR..=MAX_INVOICE_YEAR).contains(&year) {
            return Err(DomainError::validation(format!(
                "Year must be between {} and {}",
                MIN_INVOICE_YEAR, MAX_INVOICE_YEAR
            )));
        }
        Ok(Self { month, year })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        // month and year are range checked in `new`
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following month (exclusive upper bound).
    pub fn next_first_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// `LUNE-{YYYY}{MM}-{npi}`
    pub fn invoice_number(&self, npi_id: &str) -> String {
        format!(
            "{}-{:04}{:02}-{}",
            INVOICE_NUMBER_PREFIX, self.year, self.month, npi_id
        )
    }
}

/// Monthly invoice issued to an office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Invoice {
    pub id: Uuid,
    pub office_id: Uuid,
    pub invoice_number: String,
    pub month: i32,
    pub year: i32,
    /// Amount in cents
    pub total_amount: Money,
    pub status: InvoiceStatus,
    pub generated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn lifecycle_state(&self) -> LifecycleState {
        LifecycleState::from_deleted_flag(self.is_deleted)
    }
}
