//! Dashboard handler.

use axum::{extract::State, response::Json, routing::get, Router};

use billing_service::service::Dashboard;
use common::AppResult;

use crate::state::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Payment status of every active office, most urgent first
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Office statuses and global totals", body = Dashboard),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<Dashboard>> {
    Ok(Json(state.services.reporter().dashboard().await?))
}
