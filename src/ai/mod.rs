use crate::state::AppState;
use axum::Router;

pub mod client;
mod dto;
pub mod exercise;
mod handlers;

pub fn router() -> Router<AppState> {
    handlers::ai_routes()
}
