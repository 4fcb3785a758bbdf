use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::{
    auth::{
        dto::MessageResponse,
        extractors::{AuthUser, ValidatedPath},
    },
    state::AppState,
};

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/course/subjects",
            get(|_: AuthUser| async { Json(MessageResponse::pending("subject list")) }),
        )
        .route(
            "/course/list",
            get(|_: AuthUser| async { Json(MessageResponse::pending("course list")) }),
        )
        .route(
            "/course",
            post(|_: AuthUser| async { Json(MessageResponse::pending("course creation")) }),
        )
        .route(
            "/course/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
}

async fn get_course(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("course {id} details")))
}

async fn update_course(
    _: AuthUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("course {id} update")))
}

async fn delete_course(
    _: AuthUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("course {id} deletion")))
}
