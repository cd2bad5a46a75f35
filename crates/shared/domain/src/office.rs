//! Office (dental practice tenant) entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::LifecycleState;

/// A dental office. Owns devices and invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Office {
    pub id: Uuid,
    pub name: String,
    /// National Provider Identifier, unique per office
    pub npi_id: String,
    pub state: String,
    pub town: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Office {
    pub fn lifecycle_state(&self) -> LifecycleState {
        LifecycleState::from_deleted_flag(self.is_deleted)
    }
}

/// Office creation data
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOffice {
    pub name: String,
    pub npi_id: String,
    pub state: String,
    pub town: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Office update data; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOffice {
    pub name: Option<String>,
    pub npi_id: Option<String>,
    pub state: Option<String>,
    pub town: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}
