//! Unauthenticated payment-link handlers.
//!
//! Offices pay from the link in their invoice e-mail without an account;
//! intents opened here carry no user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use uuid::Uuid;

use billing_service::service::PaymentCheckout;
use common::AppResult;
use domain::PaymentIntent;

use crate::state::AppState;

/// Create public routes
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/invoices/:id/payment-intent", post(public_create_intent))
        .route("/payments/:external_id/refresh", post(public_refresh_intent))
}

/// Open a payment intent from a payment link
#[utoipa::path(
    post,
    path = "/public/invoices/{id}/payment-intent",
    tag = "Public",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 201, description = "Intent opened", body = PaymentCheckout),
        (status = 400, description = "Invoice is already paid"),
        (status = 404, description = "Invoice not found"),
        (status = 502, description = "Payment processor error")
    )
)]
pub async fn public_create_intent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<PaymentCheckout>)> {
    let checkout = state.services.payments().create_for_invoice(id, None).await?;
    Ok((StatusCode::CREATED, Json(checkout)))
}

/// Refresh an intent after the browser confirmed it
#[utoipa::path(
    post,
    path = "/public/payments/{external_id}/refresh",
    tag = "Public",
    params(("external_id" = String, Path, description = "Processor intent ID")),
    responses(
        (status = 200, description = "Stored intent", body = PaymentIntent),
        (status = 404, description = "Intent not found")
    )
)]
pub async fn public_refresh_intent(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> AppResult<Json<PaymentIntent>> {
    Ok(Json(state.services.payments().refresh(&external_id).await?))
}
