//! Lesson plans, their saved versions and exports. None of it is persisted
//! yet; every route answers with a pending notice once the caller is
//! authenticated.

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

type Pending = Json<MessageResponse>;

fn pending(feature: String) -> Pending {
    Json(MessageResponse::pending(&feature))
}

pub fn lesson_routes() -> Router<AppState> {
    Router::new()
        .route("/lesson/list", get(list_lessons))
        .route("/lesson", post(create_lesson))
        .route(
            "/lesson/:id",
            get(get_lesson)
                .put(replace_lesson)
                .patch(patch_lesson)
                .delete(delete_lesson),
        )
        .route("/lesson/:id/versions", get(list_versions))
        .route("/lesson/:id/version", post(save_version))
        .route("/lesson/:id/version/:version_id", get(get_version))
        .route("/lesson/:id/version/:version_id/restore", post(restore_version))
        .route("/lesson/:id/upload", post(upload_attachment))
        .route("/lesson/:id/export/:format", get(export_lesson))
}

async fn list_lessons(_: AuthUser) -> Pending {
    pending("lesson list".into())
}

async fn create_lesson(_: AuthUser) -> Pending {
    pending("lesson creation".into())
}

async fn get_lesson(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Pending {
    pending(format!("lesson {id} details"))
}

async fn replace_lesson(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Pending {
    pending(format!("lesson {id} update"))
}

async fn patch_lesson(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Pending {
    pending(format!("lesson {id} partial update"))
}

async fn delete_lesson(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Pending {
    pending(format!("lesson {id} deletion"))
}

async fn list_versions(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Pending {
    pending(format!("lesson {id} version list"))
}

async fn save_version(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Pending {
    pending(format!("lesson {id} version save"))
}

async fn get_version(
    _: AuthUser,
    ValidatedPath((id, version_id)): ValidatedPath<(i64, i64)>,
) -> Pending {
    pending(format!("lesson {id} version {version_id} details"))
}

async fn restore_version(
    _: AuthUser,
    ValidatedPath((id, version_id)): ValidatedPath<(i64, i64)>,
) -> Pending {
    pending(format!("lesson {id} version {version_id} restore"))
}

async fn upload_attachment(_: AuthUser, ValidatedPath(id): ValidatedPath<i64>) -> Pending {
    pending(format!("lesson {id} upload"))
}

async fn export_lesson(
    _: AuthUser,
    ValidatedPath((id, format)): ValidatedPath<(i64, ExportFormat)>,
) -> Pending {
    pending(format!("lesson {id} {} export", format.as_str()))
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
enum ExportFormat {
    Md,
    Pdf,
    Docx,
}

impl ExportFormat {
    fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Md => "markdown",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }
}
