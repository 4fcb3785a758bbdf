use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginForm, MessageResponse, PublicUser, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
        services::issue_token,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let Json(payload) = payload?;
    let user = state.register(payload).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(form) = form?;
    let response = state.login(&form.username, &form.password).await?;
    Ok(Json(response))
}

/// Tokens are stateless: the server has nothing to revoke, the client drops
/// its copy and it lapses at expiry.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(AuthUser(user): AuthUser) -> Json<MessageResponse> {
    info!("user logged out");
    Json(MessageResponse::new("Logged out"))
}

/// Re-issues an access token with a full TTL for the current bearer.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn refresh(
    State(keys): State<JwtKeys>,
    AuthUser(user): AuthUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let response = issue_token(&keys, &user)?;
    info!("access token refreshed");
    Ok(Json(response))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}
