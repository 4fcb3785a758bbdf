use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::PublicUser,
        error::AuthError,
        extractors::{AdminRole, RequireRole, ValidatedPath},
    },
    error::ApiError,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/users/:id", get(get_user).delete(delete_user))
}

#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
pub async fn get_user(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireRole<AdminRole>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(AuthError::from)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(PublicUser::from(user)))
}

/// Soft-deletes the account; its tokens stop authenticating immediately
/// because every request reloads the subject.
#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireRole<AdminRole>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.users.soft_delete(id).await.map_err(AuthError::from)? {
        info!("user soft-deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("User not found"))
    }
}
