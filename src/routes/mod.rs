use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod course;
pub mod lesson;
pub mod log;
pub mod question;
pub mod resource;
pub mod teacher;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(teacher::teacher_routes())
        .merge(course::course_routes())
        .merge(lesson::lesson_routes())
        .merge(resource::resource_routes())
        .merge(question::question_routes())
        .merge(log::log_routes())
        .merge(admin::admin_routes())
}
