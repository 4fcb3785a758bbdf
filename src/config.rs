use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` selects the in-memory credential store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub hashing: HashingConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt = JwtConfig {
            secret: get("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET must be set"))?,
            algorithm: parse_hmac_algorithm(
                &get("JWT_ALGORITHM").unwrap_or_else(|| "HS256".into()),
            )?,
            ttl_minutes: parse_or(&get, "ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,
        };
        if jwt.secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if jwt.ttl_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
        }

        let hashing = HashingConfig {
            memory_kib: parse_or(&get, "ARGON2_MEMORY_KIB", 19 * 1024)?,
            iterations: parse_or(&get, "ARGON2_ITERATIONS", 2)?,
            parallelism: parse_or(&get, "ARGON2_PARALLELISM", 1)?,
        };

        let ai = AiConfig {
            api_key: get("AI_API_KEY").unwrap_or_default(),
            base_url: get("AI_BASE_URL").unwrap_or_else(|| "https://api.openai.com".into()),
            model: get("AI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".into()),
            timeout_secs: parse_or(&get, "AI_TIMEOUT_SECS", 30)?,
        };

        Ok(Self {
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "APP_PORT", 8080)?,
            database_url: get("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            jwt,
            hashing,
            ai,
        })
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

/// Only the HMAC family is accepted: tokens are signed with a shared secret.
fn parse_hmac_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    let algorithm = Algorithm::from_str(raw.trim())
        .map_err(|e| anyhow!("invalid JWT_ALGORITHM {raw:?}: {e}"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT_ALGORITHM must be an HMAC algorithm, got {other:?}"),
    }
}
