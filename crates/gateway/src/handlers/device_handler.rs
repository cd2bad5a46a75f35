//! Device handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{CreateDevice, Device, EntityKind, PlanType, PurgedEntity, UpdateDevice};

use super::ListQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_admin, CurrentUser};
use crate::state::AppState;

/// Device registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDeviceRequest {
    #[validate(length(min = 1, message = "Serial number is required"))]
    #[schema(example = "LUNE-000123")]
    pub serial_number: String,
    pub office_id: Uuid,
    #[schema(example = "2024-01-15")]
    pub purchase_date: NaiveDate,
    #[validate(length(min = 1, message = "Connected phone is required"))]
    pub connected_phone: String,
    #[validate(length(min = 1, message = "SBC identifier is required"))]
    pub sbc_identifier: String,
    pub plan_type: PlanType,
}

impl From<CreateDeviceRequest> for CreateDevice {
    fn from(req: CreateDeviceRequest) -> Self {
        Self {
            serial_number: req.serial_number,
            office_id: req.office_id,
            purchase_date: req.purchase_date,
            connected_phone: req.connected_phone,
            sbc_identifier: req.sbc_identifier,
            plan_type: req.plan_type,
        }
    }
}

/// Device update request; omitted fields stay unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDeviceRequest {
    #[validate(length(min = 1, message = "Serial number cannot be empty"))]
    pub serial_number: Option<String>,
    /// Move the device to another active office
    pub office_id: Option<Uuid>,
    pub purchase_date: Option<NaiveDate>,
    pub connected_phone: Option<String>,
    pub sbc_identifier: Option<String>,
    pub plan_type: Option<PlanType>,
}

impl From<UpdateDeviceRequest> for UpdateDevice {
    fn from(req: UpdateDeviceRequest) -> Self {
        Self {
            serial_number: req.serial_number,
            office_id: req.office_id,
            purchase_date: req.purchase_date,
            connected_phone: req.connected_phone,
            sbc_identifier: req.sbc_identifier,
            plan_type: req.plan_type,
        }
    }
}

/// Create device routes
pub fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_devices).post(create_device))
        .route("/:id", get(get_device).put(update_device).delete(delete_device))
        .route("/:id/permanent", delete(purge_device))
        .route("/:id/restore", post(restore_device))
}

/// List devices, optionally for one office
#[utoipa::path(
    get,
    path = "/devices",
    tag = "Devices",
    security(("bearer_auth" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "Devices in the requested scope", body = Vec<Device>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Device>>> {
    let devices = state
        .services
        .devices()
        .list_devices(query.office_id, query.scope)
        .await?;
    Ok(Json(devices))
}

/// Register a device under an active office
#[utoipa::path(
    post,
    path = "/devices",
    tag = "Devices",
    security(("bearer_auth" = [])),
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 400, description = "Validation error or serial number taken"),
        (status = 404, description = "Office not found or deleted")
    )
)]
pub async fn create_device(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDeviceRequest>,
) -> AppResult<(StatusCode, Json<Device>)> {
    let device = state.services.devices().create_device(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Get a device, deleted or not
#[utoipa::path(
    get,
    path = "/devices/{id}",
    tag = "Devices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device", body = Device),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Device>> {
    Ok(Json(state.services.devices().get_device(id).await?))
}

/// Update an active device
#[utoipa::path(
    put,
    path = "/devices/{id}",
    tag = "Devices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Device ID")),
    request_body = UpdateDeviceRequest,
    responses(
        (status = 200, description = "Device updated", body = Device),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Device not found or deleted")
    )
)]
pub async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateDeviceRequest>,
) -> AppResult<Json<Device>> {
    let device = state
        .services
        .devices()
        .update_device(id, payload.into())
        .await?;
    Ok(Json(device))
}

/// Soft-delete a device (admin only)
#[utoipa::path(
    delete,
    path = "/devices/{id}",
    tag = "Devices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Device ID")),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 400, description = "Device already deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Device not found")
    )
)]
pub async fn delete_device(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&current_user)?;
    state
        .services
        .lifecycle()
        .soft_delete(EntityKind::Device, id, current_user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Permanently delete a device and its usage records (admin only)
#[utoipa::path(
    delete,
    path = "/devices/{id}/permanent",
    tag = "Devices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device removed", body = PurgedEntity),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Device not found")
    )
)]
pub async fn purge_device(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurgedEntity>> {
    require_admin(&current_user)?;
    let purged = state
        .services
        .lifecycle()
        .permanent_delete(EntityKind::Device, id, current_user.id)
        .await?;
    Ok(Json(purged))
}

/// Restore a soft-deleted device
#[utoipa::path(
    post,
    path = "/devices/{id}/restore",
    tag = "Devices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device restored", body = Device),
        (status = 404, description = "Device not found or not deleted")
    )
)]
pub async fn restore_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Device>> {
    state
        .services
        .lifecycle()
        .restore(EntityKind::Device, id)
        .await?;
    Ok(Json(state.services.devices().get_device(id).await?))
}
