use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::{
    ai::client::AiClient,
    auth::{
        jwt::JwtKeys,
        password::PasswordService,
        repo::{MemoryUserStore, PgUserStore, UserStore},
    },
    config::AppConfig,
};

/// Services owned by the process and handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub passwords: PasswordService,
    pub tokens: JwtKeys,
    pub ai: Arc<AiClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let users: Arc<dyn UserStore> = match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                // Run migrations if present
                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                info!("using postgres credential store");
                Arc::new(PgUserStore::new(db))
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                Arc::new(MemoryUserStore::new())
            }
        };

        Self::from_parts(config, users)
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let passwords = PasswordService::new(config.hashing)?;
        let tokens = JwtKeys::new(&config.jwt);
        let ai = Arc::new(AiClient::new(&config.ai)?);
        Ok(Self {
            config,
            users,
            passwords,
            tokens,
            ai,
        })
    }
}

#[cfg(test)]
impl AppState {
    pub fn test_config() -> AppConfig {
        use crate::config::{AiConfig, HashingConfig, JwtConfig};

        AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                algorithm: jsonwebtoken::Algorithm::HS256,
                ttl_minutes: 30,
            },
            hashing: HashingConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ai: AiConfig {
                api_key: "test-key".into(),
                base_url: "http://127.0.0.1:9".into(),
                model: "test-model".into(),
                timeout_secs: 1,
            },
        }
    }

    pub fn fake() -> Self {
        Self::fake_with_store(Arc::new(MemoryUserStore::new()))
    }

    pub fn fake_with_store(users: Arc<dyn UserStore>) -> Self {
        Self::from_parts(Arc::new(Self::test_config()), users).expect("fake state")
    }
}
