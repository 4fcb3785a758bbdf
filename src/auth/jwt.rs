use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::{claims::Claims, error::AuthError},
    config::JwtConfig,
    state::AppState,
};

/// Signing material and default TTL, built once at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_at(subject, OffsetDateTime::now_utc(), self.ttl)
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(subject, OffsetDateTime::now_utc(), ttl)
    }

    pub fn issue_at(
        &self,
        subject: &str,
        now: OffsetDateTime,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(AuthError::Signing)?;
        debug!(sub = %subject, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Returns the subject of a well-signed, unexpired token.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Valid only while `now < exp`, with no leeway. Malformed, badly signed
    /// and expired tokens all yield the same `InvalidToken`.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<String, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AuthError::InvalidToken
        })?;

        if now.unix_timestamp() >= data.claims.exp {
            debug!(sub = %data.claims.sub, exp = data.claims.exp, "jwt expired");
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims.sub)
    }
}
