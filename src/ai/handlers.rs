use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;
use tracing::instrument;

use crate::{
    ai::{
        dto::{
            AnalyzeQuestionRequest, ExpandLessonRequest, GenerateImageRequest,
            GenerateLessonRequest, GeneratePptRequest, GenerateQuestionRequest,
            LessonContentRequest, OptimizeLessonRequest, ParseLessonRequest,
        },
        exercise::{ExerciseItem, ExerciseRequest},
    },
    auth::{
        dto::MessageResponse,
        extractors::{AuthUser, ValidatedJson},
    },
    error::ApiError,
    state::AppState,
};

pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/ai/lesson/generate", post(generate_lesson))
        .route("/ai/lesson/expand", post(expand_lesson))
        .route("/ai/lesson/optimize", post(optimize_lesson))
        .route("/ai/lesson/summary", post(summarize_lesson))
        .route("/ai/lesson/parse", post(parse_lesson))
        .route("/ai/question/generate", post(generate_question))
        .route("/ai/question/analysis", post(analyze_question))
        .route("/ai/image/generate", post(generate_image))
        .route("/ai/board/generate", post(generate_board))
        .route("/ai/ppt/generate", post(generate_ppt))
        .route("/ai/exercise/generate", post(generate_exercises))
        .route(
            "/ai/analysis/mistakes",
            post(|_: AuthUser| async { Json(MessageResponse::pending("mistake analysis")) }),
        )
        .route(
            "/ai/analysis/class",
            post(|_: AuthUser| async { Json(MessageResponse::pending("class profile")) }),
        )
}

type AiResult = Result<Json<Value>, ApiError>;

#[instrument(skip_all, fields(user_id = %user.id))]
async fn generate_lesson(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<GenerateLessonRequest>,
) -> AiResult {
    let out = state
        .ai
        .generate_lesson(&req.topic, &req.template_type, &req.extra)
        .await?;
    Ok(Json(out))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn expand_lesson(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<ExpandLessonRequest>,
) -> AiResult {
    Ok(Json(state.ai.expand_lesson(&req.content, &req.extra).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn optimize_lesson(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<OptimizeLessonRequest>,
) -> AiResult {
    Ok(Json(state.ai.optimize_lesson(&req.content, &req.style).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn summarize_lesson(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<LessonContentRequest>,
) -> AiResult {
    Ok(Json(state.ai.summarize_lesson(&req.content).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn parse_lesson(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<ParseLessonRequest>,
) -> AiResult {
    Ok(Json(state.ai.parse_document(&req.file_url).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn generate_question(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<GenerateQuestionRequest>,
) -> AiResult {
    let out = state
        .ai
        .generate_question(&req.knowledge_point, &req.difficulty, req.count)
        .await?;
    Ok(Json(out))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn analyze_question(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<AnalyzeQuestionRequest>,
) -> AiResult {
    Ok(Json(state.ai.analyze_question(&req.question).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn generate_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<GenerateImageRequest>,
) -> AiResult {
    Ok(Json(state.ai.generate_image(&req.prompt, &req.style).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn generate_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<LessonContentRequest>,
) -> AiResult {
    Ok(Json(state.ai.generate_board(&req.content).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn generate_ppt(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<GeneratePptRequest>,
) -> AiResult {
    Ok(Json(state.ai.generate_ppt(&req.lesson_content).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn generate_exercises(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<ExerciseRequest>,
) -> Result<Json<Vec<ExerciseItem>>, ApiError> {
    Ok(Json(state.ai.generate_exercises(&req).await?))
}
