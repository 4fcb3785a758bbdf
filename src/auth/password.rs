use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::{auth::error::AuthError, config::HashingConfig};

/// Argon2id hasher with configurable cost. Cheap to clone; hashing itself is
/// CPU and memory bound, so async callers should use `spawn_blocking`.
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
    // verified against on unknown-user logins so both failure paths cost the same
    dummy_hash: String,
}

impl PasswordService {
    pub fn new(cfg: HashingConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 parameters: {e}"))?;
        let mut service = Self {
            params,
            dummy_hash: String::new(),
        };
        service.dummy_hash = service
            .hash("lessonprep-timing-equalizer")
            .map_err(|e| anyhow::anyhow!("argon2 self-test failed: {e}"))?;
        Ok(service)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Salted: hashing the same input twice yields different strings.
    pub fn hash(&self, plain: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                AuthError::Hashing
            })
    }

    /// Never errors: a mismatch or an unparseable stored hash is `false`.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        // cost parameters come from the PHC string itself
        self.argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns one verification worth of work without a real user.
    pub fn verify_dummy(&self, plain: &str) {
        let _ = self.verify(plain, &self.dummy_hash);
    }
}

#[cfg(test)]
pub(crate) fn test_service() -> PasswordService {
    PasswordService::new(HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test argon2 params")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let passwords = test_service();
        let hash = passwords.hash("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify("Secur3P@ssw0rd!", &hash));
    }

    #[test]
    fn hashing_is_salted() {
        let passwords = test_service();
        let a = passwords.hash("secret1").unwrap();
        let b = passwords.hash("secret1").unwrap();
        assert_ne!(a, b);
        assert!(passwords.verify("secret1", &a));
        assert!(passwords.verify("secret1", &b));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let passwords = test_service();
        let hash = passwords.hash("correct-horse-battery-staple").unwrap();
        assert!(!passwords.verify("wrong-password", &hash));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        let passwords = test_service();
        assert!(!passwords.verify("anything", "not-a-valid-hash"));
    }

    #[test]
    fn hashes_from_other_cost_settings_still_verify() {
        let cheap = test_service();
        let other = PasswordService::new(HashingConfig {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = other.hash("secret1").unwrap();
        assert!(cheap.verify("secret1", &hash));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let err = PasswordService::new(HashingConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(err.is_err());
    }
}
