use axum::{
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{MessageResponse, PublicUser},
        extractors::AuthUser,
    },
    state::AppState,
};

pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        .route("/teacher/profile", get(get_profile).put(update_profile))
        .route(
            "/teacher/password",
            put(|_: AuthUser| async { Json(MessageResponse::pending("password change")) }),
        )
        .route(
            "/teacher/avatar",
            post(|_: AuthUser| async { Json(MessageResponse::pending("avatar upload")) }),
        )
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_profile(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

pub async fn update_profile(_: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::pending("profile update"))
}
