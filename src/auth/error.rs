use crate::auth::{repo::StoreError, repo_types::Role};

/// Failures of the auth flow. Several variants collapse into the same
/// client-facing 401 so callers cannot tell which check failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid input")]
    Validation(#[from] validator::ValidationErrors),
    #[error("missing or malformed Authorization header")]
    MissingBearer,
    #[error("invalid or expired token")]
    InvalidToken,
    /// Token verified but its subject no longer resolves to a live, active user.
    #[error("token subject does not resolve to an active user")]
    UnknownSubject,
    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("role {required} required")]
    Forbidden { required: Role },
    #[error("{field} already registered")]
    Conflict { field: &'static str },
    #[error("password could not be processed")]
    Hashing,
    #[error("token could not be issued")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Store(anyhow::Error),
    #[error("background task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field } => AuthError::Conflict { field },
            StoreError::Backend(e) => AuthError::Store(e),
        }
    }
}
