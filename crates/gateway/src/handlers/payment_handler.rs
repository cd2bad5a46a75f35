//! Payment intent handlers for signed-in staff.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use billing_service::service::PaymentCheckout;
use common::AppResult;
use domain::PaymentIntent;

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateIntentRequest {
    pub invoice_id: Uuid,
}

/// Create payment routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/intents", post(create_intent))
        .route("/intents/:external_id/refresh", post(refresh_intent))
}

/// Open a payment intent for the full amount of an unpaid invoice
#[utoipa::path(
    post,
    path = "/payments/intents",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CreateIntentRequest,
    responses(
        (status = 201, description = "Intent opened", body = PaymentCheckout),
        (status = 400, description = "Invoice is already paid"),
        (status = 404, description = "Invoice not found"),
        (status = 502, description = "Payment processor error")
    )
)]
pub async fn create_intent(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateIntentRequest>,
) -> AppResult<(StatusCode, Json<PaymentCheckout>)> {
    let checkout = state
        .services
        .payments()
        .create_for_invoice(payload.invoice_id, Some(current_user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(checkout)))
}

/// Pull the processor state of an intent; a succeeded intent pays its invoice
#[utoipa::path(
    post,
    path = "/payments/intents/{external_id}/refresh",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("external_id" = String, Path, description = "Processor intent ID")),
    responses(
        (status = 200, description = "Stored intent", body = PaymentIntent),
        (status = 404, description = "Intent not found"),
        (status = 502, description = "Payment processor error")
    )
)]
pub async fn refresh_intent(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> AppResult<Json<PaymentIntent>> {
    Ok(Json(state.services.payments().refresh(&external_id).await?))
}
