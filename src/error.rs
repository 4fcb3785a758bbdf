use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::{ai::client::AiError, auth::error::AuthError};

const UNAUTHENTICATED: &str = "Could not validate credentials";
const INTERNAL: &str = "An unexpected server error occurred.";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Boundary error: every handler failure ends up here and leaves as the
/// uniform JSON envelope.
#[derive(Debug)]
pub enum ApiError {
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    code: u16,
    message: String,
    errors: Vec<FieldError>,
}

impl ApiError {
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn internal() -> Self {
        ApiError::Internal(INTERNAL.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // duplicates are reported as 400 alongside other bad input
            ApiError::Validation { .. } | ApiError::BadRequest(_) | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, errors) = match self {
            ApiError::Validation { message, errors } => (message, errors),
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => (msg, Vec::new()),
        };

        let body = Json(ErrorBody {
            success: false,
            code: status.as_u16(),
            message,
            errors,
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errs: ValidationErrors) -> Self {
        let mut errors: Vec<FieldError> = errs
            .field_errors()
            .into_iter()
            .flat_map(|(field, list)| {
                list.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation {
            message: "Input data validation error.".into(),
            errors,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "json body rejected");
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        warn!(error = %rejection.body_text(), "form body rejected");
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "path parameters rejected");
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errs) => errs.into(),
            AuthError::MissingBearer | AuthError::InvalidToken | AuthError::UnknownSubject => {
                ApiError::Unauthorized(UNAUTHENTICATED.into())
            }
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Incorrect username or password".into())
            }
            AuthError::Forbidden { .. } => ApiError::Forbidden("Insufficient permissions".into()),
            AuthError::Conflict { field } => ApiError::Conflict(format!("{field} already registered")),
            AuthError::Hashing => ApiError::BadRequest(AuthError::Hashing.to_string()),
            AuthError::Signing(e) => {
                error!(error = %e, "jwt signing failed");
                ApiError::internal()
            }
            AuthError::Store(e) => {
                error!(error = ?e, "credential store failure");
                ApiError::internal()
            }
            AuthError::Join(e) => {
                error!(error = %e, "blocking task failed");
                ApiError::internal()
            }
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        error!(error = %err, "ai service call failed");
        ApiError::Internal("AI service request failed".into())
    }
}
