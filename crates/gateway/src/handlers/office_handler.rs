//! Office handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{CreateOffice, EntityKind, Office, OfficeFinancials, PurgedEntity, UpdateOffice};

use super::ListQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_admin, CurrentUser};
use crate::state::AppState;

/// Office creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOfficeRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Bright Smiles Dental")]
    pub name: String,
    /// National Provider Identifier, 10 digits
    #[schema(example = "1234567890")]
    pub npi_id: String,
    #[validate(length(min = 1, message = "State is required"))]
    #[schema(example = "CA")]
    pub state: String,
    #[validate(length(min = 1, message = "Town is required"))]
    #[schema(example = "Fresno")]
    pub town: String,
    #[validate(length(min = 1, message = "Address is required"))]
    #[schema(example = "1 Main St")]
    pub address: String,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl From<CreateOfficeRequest> for CreateOffice {
    fn from(req: CreateOfficeRequest) -> Self {
        Self {
            name: req.name,
            npi_id: req.npi_id,
            state: req.state,
            town: req.town,
            address: req.address,
            phone: req.phone,
            email: req.email,
        }
    }
}

/// Office update request; omitted fields stay unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOfficeRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub npi_id: Option<String>,
    pub state: Option<String>,
    pub town: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl From<UpdateOfficeRequest> for UpdateOffice {
    fn from(req: UpdateOfficeRequest) -> Self {
        Self {
            name: req.name,
            npi_id: req.npi_id,
            state: req.state,
            town: req.town,
            address: req.address,
            phone: req.phone,
            email: req.email,
        }
    }
}

/// Create office routes
pub fn office_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_offices).post(create_office))
        .route("/:id", get(get_office).put(update_office).delete(delete_office))
        .route("/:id/summary", get(office_summary))
        .route("/:id/permanent", delete(purge_office))
        .route("/:id/restore", post(restore_office))
}

/// List offices
#[utoipa::path(
    get,
    path = "/offices",
    tag = "Offices",
    security(("bearer_auth" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "Offices in the requested scope", body = Vec<Office>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_offices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Office>>> {
    let offices = state.services.offices().list_offices(query.scope).await?;
    Ok(Json(offices))
}

/// Create an office
#[utoipa::path(
    post,
    path = "/offices",
    tag = "Offices",
    security(("bearer_auth" = [])),
    request_body = CreateOfficeRequest,
    responses(
        (status = 201, description = "Office created", body = Office),
        (status = 400, description = "Validation error or NPI already registered")
    )
)]
pub async fn create_office(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOfficeRequest>,
) -> AppResult<(StatusCode, Json<Office>)> {
    let office = state.services.offices().create_office(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(office)))
}

/// Get an office, deleted or not
#[utoipa::path(
    get,
    path = "/offices/{id}",
    tag = "Offices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Office ID")),
    responses(
        (status = 200, description = "Office", body = Office),
        (status = 404, description = "Office not found")
    )
)]
pub async fn get_office(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Office>> {
    Ok(Json(state.services.offices().get_office(id).await?))
}

/// Update an active office
#[utoipa::path(
    put,
    path = "/offices/{id}",
    tag = "Offices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Office ID")),
    request_body = UpdateOfficeRequest,
    responses(
        (status = 200, description = "Office updated", body = Office),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Office not found or deleted")
    )
)]
pub async fn update_office(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOfficeRequest>,
) -> AppResult<Json<Office>> {
    let office = state
        .services
        .offices()
        .update_office(id, payload.into())
        .await?;
    Ok(Json(office))
}

/// Financial status of an office
#[utoipa::path(
    get,
    path = "/offices/{id}/summary",
    tag = "Offices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Office ID")),
    responses(
        (status = 200, description = "Invoice totals and payment status", body = OfficeFinancials),
        (status = 404, description = "Office not found")
    )
)]
pub async fn office_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OfficeFinancials>> {
    Ok(Json(state.services.reporter().office_status(id).await?))
}

/// Soft-delete an office and its devices (admin only)
#[utoipa::path(
    delete,
    path = "/offices/{id}",
    tag = "Offices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Office ID")),
    responses(
        (status = 204, description = "Office deleted"),
        (status = 400, description = "Office already deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Office not found")
    )
)]
pub async fn delete_office(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&current_user)?;
    state
        .services
        .lifecycle()
        .soft_delete(EntityKind::Office, id, current_user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Permanently delete an office with its devices, invoices and usage (admin only)
#[utoipa::path(
    delete,
    path = "/offices/{id}/permanent",
    tag = "Offices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Office ID")),
    responses(
        (status = 200, description = "Office removed", body = PurgedEntity),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Office not found"),
        (status = 500, description = "Removal failed; nothing was changed")
    )
)]
pub async fn purge_office(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurgedEntity>> {
    require_admin(&current_user)?;
    let purged = state
        .services
        .lifecycle()
        .permanent_delete(EntityKind::Office, id, current_user.id)
        .await?;
    Ok(Json(purged))
}

/// Restore a soft-deleted office and its devices
#[utoipa::path(
    post,
    path = "/offices/{id}/restore",
    tag = "Offices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Office ID")),
    responses(
        (status = 200, description = "Office restored", body = Office),
        (status = 404, description = "Office not found or not deleted")
    )
)]
pub async fn restore_office(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Office>> {
    state
        .services
        .lifecycle()
        .restore(EntityKind::Office, id)
        .await?;
    Ok(Json(state.services.offices().get_office(id).await?))
}
