//! HTTP request handlers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use domain::ListScope;

pub mod auth_handler;
pub mod dashboard_handler;
pub mod device_handler;
pub mod health_handler;
pub mod invoice_handler;
pub mod office_handler;
pub mod payment_handler;
pub mod public_handler;
pub mod usage_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use dashboard_handler::dashboard_routes;
pub use device_handler::device_routes;
pub use health_handler::health_routes;
pub use invoice_handler::invoice_routes;
pub use office_handler::office_routes;
pub use payment_handler::payment_routes;
pub use public_handler::public_routes;
pub use usage_handler::usage_routes;
pub use user_handler::user_routes;

/// Plain confirmation body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// `active` (default), `deleted` or `all`
    #[serde(default)]
    pub scope: ListScope,
    /// Restrict to one office
    pub office_id: Option<Uuid>,
}
