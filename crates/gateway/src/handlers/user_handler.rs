//! User administration handlers.

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
use domain::{EntityKind, PurgedEntity, UpdateUser, UserResponse, UserRole};

use super::ListQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_admin, CurrentUser};
use crate::state::AppState;

/// User update request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "front-desk@brightsmiles.com")]
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/permanent", delete(purge_user))
        .route("/:id/restore", post(restore_user))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "Users in the requested scope", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(&current_user)?;
    let users = state.services.users().list_users(query.scope).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID (admin only)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.services.users().get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update e-mail or role (admin only)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error or own admin role removed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current_user)?;

    let user = state
        .services
        .users()
        .update_user(
            id,
            current_user.id,
            UpdateUser {
                email: payload.email,
                role: payload.role,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Deactivate a user (admin only, cannot delete self)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deactivated"),
        (status = 400, description = "Own account or already deactivated"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&current_user)?;
    state
        .services
        .lifecycle()
        .soft_delete(EntityKind::User, id, current_user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Permanently delete a non-admin user (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}/permanent",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User removed", body = PurgedEntity),
        (status = 400, description = "Own account or an admin account"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn purge_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurgedEntity>> {
    require_admin(&current_user)?;
    let purged = state
        .services
        .lifecycle()
        .permanent_delete(EntityKind::User, id, current_user.id)
        .await?;
    Ok(Json(purged))
}

/// Reactivate a user
#[utoipa::path(
    post,
    path = "/users/{id}/restore",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID to restore")),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 404, description = "User not found or not deleted")
    )
)]
pub async fn restore_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    state
        .services
        .lifecycle()
        .restore(EntityKind::User, id)
        .await?;
    let user = state.services.users().get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}
