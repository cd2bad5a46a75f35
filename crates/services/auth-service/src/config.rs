//! Auth service configuration.

use thiserror::Error;

use common::{env_list, env_opt, env_parse, JwtConfig};
use domain::{DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_RESET_TOKEN_TTL_MINUTES, MIN_JWT_SECRET_LENGTH};

/// Secret used by debug builds when `JWT_SECRET` is not set.
#[cfg(debug_assertions)]
const DEV_JWT_SECRET: &str = "lune-billing-development-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthConfigError {
    #[error("JWT_SECRET must be set (minimum {min} characters)", min = MIN_JWT_SECRET_LENGTH)]
    MissingSecret,

    #[error("JWT_SECRET is {0} characters, minimum is {min}", min = MIN_JWT_SECRET_LENGTH)]
    SecretTooShort(usize),
}

/// Auth service configuration.
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    pub jwt: JwtConfig,
    /// Lifetime of a password reset token
    pub reset_token_ttl_minutes: i64,
    /// Usernames that receive the admin role on registration
    pub admin_seed_usernames: Vec<String>,
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AuthConfigError> {
        let secret = resolve_secret(env_opt("JWT_SECRET"))?;

        Ok(Self {
            jwt: JwtConfig {
                secret,
                expiration_hours: env_parse("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS),
            },
            reset_token_ttl_minutes: env_parse(
                "RESET_TOKEN_TTL_MINUTES",
                DEFAULT_RESET_TOKEN_TTL_MINUTES,
            ),
            admin_seed_usernames: env_list("ADMIN_SEED_USERNAMES"),
        })
    }

    /// Configuration with an explicit secret, used by tests and tooling.
    pub fn with_secret(secret: impl Into<String>) -> Result<Self, AuthConfigError> {
        Ok(Self {
            jwt: JwtConfig {
                secret: resolve_secret(Some(secret.into()))?,
                expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            },
            reset_token_ttl_minutes: DEFAULT_RESET_TOKEN_TTL_MINUTES,
            admin_seed_usernames: Vec::new(),
        })
    }

    pub fn is_seed_admin(&self, username: &str) -> bool {
        self.admin_seed_usernames.iter().any(|u| u == username)
    }
}

fn resolve_secret(secret: Option<String>) -> Result<String, AuthConfigError> {
    let secret = match secret {
        Some(secret) => secret,
        None => return fallback_secret(),
    };

    let length = secret.chars().count();
    if length < MIN_JWT_SECRET_LENGTH {
        return Err(AuthConfigError::SecretTooShort(length));
    }
    Ok(secret)
}

#[cfg(debug_assertions)]
fn fallback_secret() -> Result<String, AuthConfigError> {
    tracing::warn!("JWT_SECRET not set, using the development secret");
    Ok(DEV_JWT_SECRET.to_string())
}

#[cfg(not(debug_assertions))]
fn fallback_secret() -> Result<String, AuthConfigError> {
    Err(AuthConfigError::MissingSecret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_is_rejected() {
        assert_eq!(
            resolve_secret(Some("too-short".to_string())),
            Err(AuthConfigError::SecretTooShort(9))
        );
    }

    #[test]
    fn test_long_secret_is_kept() {
        let secret = "x".repeat(MIN_JWT_SECRET_LENGTH);
        assert_eq!(resolve_secret(Some(secret.clone())), Ok(secret));
    }

    #[test]
    fn test_seed_admin_lookup() {
        let mut config = AuthServiceConfig::with_secret("x".repeat(40)).unwrap();
        config.admin_seed_usernames = vec!["lune".to_string()];

        assert!(config.is_seed_admin("lune"));
        assert!(!config.is_seed_admin("Lune"));
    }
}
