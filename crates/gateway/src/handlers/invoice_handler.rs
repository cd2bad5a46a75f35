//! Invoice handlers.

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
use domain::{EntityKind, Invoice, PurgedEntity};

use super::ListQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_admin, CurrentUser};
use crate::state::AppState;

/// Monthly invoice generation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateInvoiceRequest {
    pub office_id: Uuid,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
}

/// Create invoice routes
pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices))
        .route("/generate", post(generate_invoice))
        .route("/:id", get(get_invoice).delete(delete_invoice))
        .route("/:id/mark-paid", post(mark_paid))
        .route("/:id/mark-unpaid", post(mark_unpaid))
        .route("/:id/permanent", delete(purge_invoice))
        .route("/:id/restore", post(restore_invoice))
}

/// List invoices, newest period first
#[utoipa::path(
    get,
    path = "/invoices",
    tag = "Invoices",
    security(("bearer_auth" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "Invoices in the requested scope", body = Vec<Invoice>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    let invoices = state
        .services
        .invoices()
        .list_invoices(query.office_id, query.scope)
        .await?;
    Ok(Json(invoices))
}

/// Generate the invoice of an office for one month
#[utoipa::path(
    post,
    path = "/invoices/generate",
    tag = "Invoices",
    security(("bearer_auth" = [])),
    request_body = GenerateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice generated", body = Invoice),
        (status = 400, description = "Invalid period or invoice already exists"),
        (status = 404, description = "Office not found or deleted")
    )
)]
pub async fn generate_invoice(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GenerateInvoiceRequest>,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    let invoice = state
        .services
        .invoices()
        .generate(payload.office_id, payload.month, payload.year)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Get an invoice
#[utoipa::path(
    get,
    path = "/invoices/{id}",
    tag = "Invoices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice", body = Invoice),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Invoice>> {
    Ok(Json(state.services.invoices().get_invoice(id).await?))
}

/// Mark an invoice paid outside the payment processor
#[utoipa::path(
    post,
    path = "/invoices/{id}/mark-paid",
    tag = "Invoices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice paid", body = Invoice),
        (status = 400, description = "Invoice is already paid"),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Invoice>> {
    Ok(Json(state.services.invoices().mark_paid(id).await?))
}

/// Reopen a paid invoice
#[utoipa::path(
    post,
    path = "/invoices/{id}/mark-unpaid",
    tag = "Invoices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice unpaid", body = Invoice),
        (status = 400, description = "Invoice is already unpaid"),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn mark_unpaid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Invoice>> {
    Ok(Json(state.services.invoices().mark_unpaid(id).await?))
}

/// Soft-delete an invoice (admin only)
#[utoipa::path(
    delete,
    path = "/invoices/{id}",
    tag = "Invoices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 400, description = "Invoice already deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn delete_invoice(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&current_user)?;
    state
        .services
        .lifecycle()
        .soft_delete(EntityKind::Invoice, id, current_user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Permanently delete an invoice and its payment intents (admin only)
#[utoipa::path(
    delete,
    path = "/invoices/{id}/permanent",
    tag = "Invoices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice removed", body = PurgedEntity),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn purge_invoice(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurgedEntity>> {
    require_admin(&current_user)?;
    let purged = state
        .services
        .lifecycle()
        .permanent_delete(EntityKind::Invoice, id, current_user.id)
        .await?;
    Ok(Json(purged))
}

/// Restore a soft-deleted invoice
#[utoipa::path(
    post,
    path = "/invoices/{id}/restore",
    tag = "Invoices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice restored", body = Invoice),
        (status = 404, description = "Invoice not found or not deleted")
    )
)]
pub async fn restore_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Invoice>> {
    state
        .services
        .lifecycle()
        .restore(EntityKind::Invoice, id)
        .await?;
    Ok(Json(state.services.invoices().get_invoice(id).await?))
}
