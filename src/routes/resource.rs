use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::{
    auth::{
        dto::MessageResponse,
        extractors::{AuthUser, ValidatedPath},
    },
    state::AppState,
};

pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resource/upload",
            post(|_: AuthUser| async { Json(MessageResponse::pending("resource upload")) }),
        )
        .route(
            "/resource/list",
            get(|_: AuthUser| async { Json(MessageResponse::pending("resource list")) }),
        )
        .route(
            "/resource/tags",
            get(|_: AuthUser| async { Json(MessageResponse::pending("resource tag list")) })
                .post(|_: AuthUser| async {
                    Json(MessageResponse::pending("resource tag creation"))
                }),
        )
        .route("/resource/tags/:tag", delete(delete_tag))
        .route("/resource/:id", put(update_resource).delete(delete_resource))
}

async fn update_resource(
    _: AuthUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("resource {id} update")))
}

async fn delete_resource(
    _: AuthUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("resource {id} deletion")))
}

async fn delete_tag(
    _: AuthUser,
    ValidatedPath(tag): ValidatedPath<String>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("resource tag '{tag}' deletion")))
}
