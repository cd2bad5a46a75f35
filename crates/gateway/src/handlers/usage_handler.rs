//! Usage ingestion handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{NewUsageRecord, UsageRecord};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// One treatment session reported by a device
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UsageRequest {
    pub device_id: Uuid,
    #[validate(range(min = 1, message = "Button number must be positive"))]
    #[schema(example = 1)]
    pub button_number: i32,
    pub start_time: DateTime<Utc>,
    /// Must be after `start_time`
    pub end_time: DateTime<Utc>,
}

impl From<UsageRequest> for NewUsageRecord {
    fn from(req: UsageRequest) -> Self {
        Self {
            device_id: req.device_id,
            button_number: req.button_number,
            start_time: req.start_time,
            end_time: req.end_time,
        }
    }
}

/// Batch of sessions stored all-or-nothing
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkUsageRequest {
    #[validate(length(min = 1, message = "At least one record is required"), nested)]
    pub records: Vec<UsageRequest>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsageQuery {
    pub device_id: Option<Uuid>,
}

/// Create usage routes
pub fn usage_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_usage).post(record_usage))
        .route("/bulk", post(record_bulk))
}

/// Usage records of one device
#[utoipa::path(
    get,
    path = "/usage",
    tag = "Usage",
    security(("bearer_auth" = [])),
    params(UsageQuery),
    responses(
        (status = 200, description = "Sessions, oldest first", body = Vec<UsageRecord>),
        (status = 400, description = "device_id missing")
    )
)]
pub async fn list_usage(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
) -> AppResult<Json<Vec<UsageRecord>>> {
    let device_id = query
        .device_id
        .ok_or_else(|| AppError::validation("device_id is required"))?;
    let records = state.services.usage().list_for_device(device_id).await?;
    Ok(Json(records))
}

/// Record one session
#[utoipa::path(
    post,
    path = "/usage",
    tag = "Usage",
    security(("bearer_auth" = [])),
    request_body = UsageRequest,
    responses(
        (status = 201, description = "Session stored", body = UsageRecord),
        (status = 400, description = "end_time is not after start_time"),
        (status = 404, description = "Device not found or deleted")
    )
)]
pub async fn record_usage(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UsageRequest>,
) -> AppResult<(StatusCode, Json<UsageRecord>)> {
    let record = state.services.usage().record(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Record a batch of sessions; one invalid record rejects the whole batch
#[utoipa::path(
    post,
    path = "/usage/bulk",
    tag = "Usage",
    security(("bearer_auth" = [])),
    request_body = BulkUsageRequest,
    responses(
        (status = 201, description = "Every session stored", body = Vec<UsageRecord>),
        (status = 400, description = "A record is invalid; nothing was stored"),
        (status = 404, description = "A device was not found or is deleted")
    )
)]
pub async fn record_bulk(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BulkUsageRequest>,
) -> AppResult<(StatusCode, Json<Vec<UsageRecord>>)> {
    let records = payload.records.into_iter().map(Into::into).collect();
    let stored = state.services.usage().record_bulk(records).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}
