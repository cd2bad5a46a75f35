//! Payment intents recorded against invoices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::PROCESSOR_STATUS_SUCCEEDED;
use crate::money::Money;

/// Local record of an intent created at the payment processor.
///
/// Immutable except for `status`, which mirrors the processor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PaymentIntent {
    pub id: Uuid,
    pub external_intent_id: String,
    pub invoice_id: Uuid,
    pub office_id: Uuid,
    /// `None` for intents created through a public payment link
    pub user_id: Option<Uuid>,
    pub amount: Money,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == PROCESSOR_STATUS_SUCCEEDED
    }
}
