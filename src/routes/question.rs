use axum::{
    routing::{delete, get, post},
    Json, Router,
};

use crate::{
    auth::{
        dto::MessageResponse,
        extractors::{AuthUser, ValidatedPath},
    },
    state::AppState,
};

pub fn question_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/question",
            post(|_: AuthUser| async { Json(MessageResponse::pending("question creation")) }),
        )
        .route(
            "/question/list",
            get(|_: AuthUser| async { Json(MessageResponse::pending("question list")) }),
        )
        .route(
            "/question/tags",
            get(|_: AuthUser| async { Json(MessageResponse::pending("question tag list")) })
                .post(|_: AuthUser| async {
                    Json(MessageResponse::pending("question tag creation"))
                }),
        )
        .route("/question/tags/:tag", delete(delete_tag))
        .route(
            "/question/:id",
            get(get_question).put(update_question).delete(delete_question),
        )
}

async fn get_question(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("question {id} details")))
}

async fn update_question(
    _: AuthUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("question {id} update")))
}

async fn delete_question(
    _: AuthUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("question {id} deletion")))
}

async fn delete_tag(
    _: AuthUser,
    ValidatedPath(tag): ValidatedPath<String>,
) -> Json<MessageResponse> {
    Json(MessageResponse::pending(&format!("question tag '{tag}' deletion")))
}
