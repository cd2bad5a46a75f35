//! Device ("Lune machine") entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::lifecycle::LifecycleState;

/// Billing plan a device is enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PlanType {
    /// Flat fee per billing month
    Monthly,
    /// Fee per recorded treatment session
    PerSession,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Monthly => "monthly",
            PlanType::PerSession => "per_session",
        }
    }
}

impl std::str::FromStr for PlanType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "monthly" => Ok(PlanType::Monthly),
            "per_session" => Ok(PlanType::PerSession),
            other => Err(DomainError::validation(format!(
                "Unknown plan type '{}'. Must be 'monthly' or 'per_session'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Lune laser machine installed at an office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Device {
    pub id: Uuid,
    pub serial_number: String,
    pub office_id: Uuid,
    pub purchase_date: NaiveDate,
    pub connected_phone: String,
    /// Identifier of the single-board computer reporting usage
    pub sbc_identifier: String,
    pub plan_type: PlanType,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    pub fn lifecycle_state(&self) -> LifecycleState {
        LifecycleState::from_deleted_flag(self.is_deleted)
    }
}

/// Device creation data
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDevice {
    pub serial_number: String,
    pub office_id: Uuid,
    pub purchase_date: NaiveDate,
    pub connected_phone: String,
    pub sbc_identifier: String,
    pub plan_type: PlanType,
}

/// Device update data; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDevice {
    pub serial_number: Option<String>,
    pub office_id: Option<Uuid>,
    pub purchase_date: Option<NaiveDate>,
    pub connected_phone: Option<String>,
    pub sbc_identifier: Option<String>,
    pub plan_type: Option<PlanType>,
}
