use axum::{routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::MessageResponse,
        extractors::{AdminRole, RequireRole, ValidatedPath},
    },
    state::AppState,
};

/// Operation log, readable by administrators only.
pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/log/list", get(list_logs))
        .route("/log/:id", get(get_log))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
async fn list_logs(RequireRole(admin, _): RequireRole<AdminRole>) -> Json<MessageResponse> {
    Json(MessageResponse::pending("operation log list"))
}

#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
async fn get_log(
    RequireRole(admin, _): RequireRole<AdminRole>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("operation log {id} details")))
}
