use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        error::AuthError,
        repo_types::{Role, User},
    },
    error::ApiError,
    state::AppState,
};

/// Authenticated caller: the bearer token verified and its subject loaded.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(AuthUser).map_err(|e| {
            warn!(reason = %e, "authentication failed");
            ApiError::from(e)
        })
    }
}

pub async fn authenticate(parts: &Parts, state: &AppState) -> Result<User, AuthError> {
    let token = bearer_token(parts).ok_or(AuthError::MissingBearer)?;
    let subject = state.tokens.verify(token)?;
    let user_id: Uuid = subject.parse().map_err(|_| AuthError::InvalidToken)?;

    match state.users.find_by_id(user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AuthError::UnknownSubject),
    }
}

/// `Authorization: Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Exact-match role check: an admin does not pass a teacher gate.
pub fn authorize(user: User, required: Role) -> Result<User, AuthError> {
    if user.role == required {
        Ok(user)
    } else {
        Err(AuthError::Forbidden { required })
    }
}

pub trait RequiredRole: Send + Sync {
    const ROLE: Role;
}

pub struct TeacherRole;
pub struct AdminRole;

impl RequiredRole for TeacherRole {
    const ROLE: Role = Role::Teacher;
}

impl RequiredRole for AdminRole {
    const ROLE: Role = Role::Admin;
}

/// `authenticate` followed by `authorize(user, R::ROLE)`.
pub struct RequireRole<R>(pub User, pub PhantomData<R>);

#[async_trait]
impl<R: RequiredRole + 'static> FromRequestParts<AppState> for RequireRole<R> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        let user_id = user.id;
        authorize(user, R::ROLE)
            .map(|u| RequireRole(u, PhantomData))
            .map_err(|e| {
                warn!(%user_id, required = %R::ROLE, "role check failed");
                ApiError::from(e)
            })
    }
}

/// JSON body that is deserialized and then validated; both failures use the
/// error envelope.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Path parameters whose parse failures leave through the error envelope.
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ValidatedPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use time::OffsetDateTime;

    fn user(role: Role) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: String::new(),
            full_name: None,
            role,
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/me");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn teacher_is_forbidden_from_admin_gate() {
        let err = authorize(user(Role::Teacher), Role::Admin).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden { required: Role::Admin }));
    }

    #[test]
    fn role_match_is_exact() {
        assert!(authorize(user(Role::Admin), Role::Teacher).is_err());
        let passed = authorize(user(Role::Teacher), Role::Teacher).unwrap();
        assert_eq!(passed.role, Role::Teacher);
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer"))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }

    #[tokio::test]
    async fn authenticate_outcomes() {
        let state = AppState::fake();
        let stored = state
            .users
            .insert(crate::auth::repo_types::NewUser {
                username: "alice".into(),
                email: "a@x.com".into(),
                password_hash: "unused".into(),
                full_name: None,
                role: Role::Teacher,
            })
            .await
            .unwrap();

        assert!(matches!(
            authenticate(&parts(None), &state).await,
            Err(AuthError::MissingBearer)
        ));

        let expired = state
            .tokens
            .issue_with_ttl(&stored.id.to_string(), time::Duration::seconds(-1))
            .unwrap();
        assert!(matches!(
            authenticate(&parts(Some(&format!("Bearer {expired}"))), &state).await,
            Err(AuthError::InvalidToken)
        ));

        let not_a_uuid = state.tokens.issue("42").unwrap();
        assert!(matches!(
            authenticate(&parts(Some(&format!("Bearer {not_a_uuid}"))), &state).await,
            Err(AuthError::InvalidToken)
        ));

        let token = state.tokens.issue(&stored.id.to_string()).unwrap();
        let header = format!("Bearer {token}");
        let found = authenticate(&parts(Some(&header)), &state).await.unwrap();
        assert_eq!(found.id, stored.id);

        state.users.soft_delete(stored.id).await.unwrap();
        assert!(matches!(
            authenticate(&parts(Some(&header)), &state).await,
            Err(AuthError::UnknownSubject)
        ));
    }
}
