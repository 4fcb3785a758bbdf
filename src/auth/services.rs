use tracing::{info, warn};
use validator::Validate;

use crate::{
    auth::{
        dto::{RegisterRequest, TokenResponse},
        error::AuthError,
        jwt::JwtKeys,
        password::PasswordService,
        repo::UserStore,
        repo_types::{NewUser, Role, User},
    },
    state::AppState,
};

/// Validates, hashes and persists a new teacher account.
pub async fn register_user(
    users: &dyn UserStore,
    passwords: &PasswordService,
    request: RegisterRequest,
) -> Result<User, AuthError> {
    let request = request.normalized();
    request.validate()?;

    // Fast path only; the store's unique indexes have the final say.
    if users.find_by_username(&request.username).await?.is_some() {
        warn!(username = %request.username, "username already registered");
        return Err(AuthError::Conflict { field: "username" });
    }
    if users.find_by_email(&request.email).await?.is_some() {
        warn!(email = %request.email, "email already registered");
        return Err(AuthError::Conflict { field: "email" });
    }

    let hasher = passwords.clone();
    let plain = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&plain)).await??;

    let user = users
        .insert(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            full_name: request.full_name,
            role: Role::Teacher,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "insert user rejected");
            AuthError::from(e)
        })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Checks credentials and issues an access token. Unknown user, wrong
/// password and inactive account are the same error.
pub async fn login_user(
    users: &dyn UserStore,
    passwords: &PasswordService,
    keys: &JwtKeys,
    username: &str,
    password: &str,
) -> Result<TokenResponse, AuthError> {
    let username = username.trim();
    let found = users.find_by_username(username).await?;

    let hasher = passwords.clone();
    let plain = password.to_owned();
    let stored_hash = found.as_ref().map(|u| u.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => hasher.verify(&plain, &hash),
        None => {
            hasher.verify_dummy(&plain);
            false
        }
    })
    .await?;

    let user = match found {
        Some(user) if verified && user.is_active => user,
        Some(user) => {
            warn!(user_id = %user.id, active = user.is_active, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        None => {
            warn!(%username, "login for unknown username");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let response = issue_token(keys, &user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(response)
}

/// Fresh access token for an already authenticated user.
pub fn issue_token(keys: &JwtKeys, user: &User) -> Result<TokenResponse, AuthError> {
    let token = keys.issue(&user.id.to_string())?;
    Ok(TokenResponse::bearer(token, keys.default_ttl().whole_seconds()))
}

impl AppState {
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        register_user(self.users.as_ref(), &self.passwords, request).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AuthError> {
        login_user(
            self.users.as_ref(),
            &self.passwords,
            &self.tokens,
            username,
            password,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::MemoryUserStore;
    use std::sync::Arc;

    fn alice() -> RegisterRequest {
        RegisterRequest {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "secret1".into(),
            full_name: Some("Alice Liddell".into()),
        }
    }

    #[tokio::test]
    async fn register_stores_hash_and_default_role() {
        let state = AppState::fake();
        let user = state.register(alice()).await.unwrap();
        assert_eq!(user.role, Role::Teacher);
        assert!(user.is_active);
        assert_ne!(user.password_hash, "secret1");
        assert!(state.passwords.verify("secret1", &user.password_hash));
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let state = AppState::fake();
        state.register(alice()).await.unwrap();

        let mut same_name = alice();
        same_name.email = "other@x.com".into();
        assert!(matches!(
            state.register(same_name).await,
            Err(AuthError::Conflict { field: "username" })
        ));

        let mut same_email = alice();
        same_email.username = "alice2".into();
        same_email.email = "A@X.COM".into();
        assert!(matches!(
            state.register(same_email).await,
            Err(AuthError::Conflict { field: "email" })
        ));
    }

    #[tokio::test]
    async fn invalid_input_is_a_validation_error() {
        let state = AppState::fake();
        let mut bad = alice();
        bad.username = "  a ".into();
        assert!(matches!(state.register(bad).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn concurrent_registration_admits_exactly_one() {
        let state = AppState::fake();
        let mut tasks = Vec::new();
        for i in 0..8 {
            let state = state.clone();
            tasks.push(tokio::spawn(async move {
                let mut req = alice();
                req.email = format!("alice{i}@x.com");
                state.register(req).await
            }));
        }

        let mut ok = 0;
        let mut conflicts = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AuthError::Conflict { field: "username" }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let state = AppState::fake();
        let user = state.register(alice()).await.unwrap();

        let response = state.login("alice", "secret1").await.unwrap();
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.expires_in, 30 * 60);
        assert_eq!(
            state.tokens.verify(&response.access_token).unwrap(),
            user.id.to_string()
        );
    }

    #[tokio::test]
    async fn login_failures_are_uniform() {
        let state = AppState::fake();
        state.register(alice()).await.unwrap();

        let wrong_password = state.login("alice", "nope!!").await.unwrap_err();
        let unknown_user = state.login("mallory", "secret1").await.unwrap_err();
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn inactive_user_cannot_log_in() {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::fake_with_store(store.clone());
        let user = state.register(alice()).await.unwrap();
        store.set_active(user.id, false).await;

        assert!(matches!(
            state.login("alice", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
