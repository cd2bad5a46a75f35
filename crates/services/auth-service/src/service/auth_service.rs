//! Authentication service - accounts, tokens and password resets.
//!
//! Passwords are hashed with the domain `Password` value object; tokens are
//! HS256 JWTs signed with the configured secret.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use billing_service::notify::Notifier;
use billing_service::repository::NewUser;
use common::{AppError, AppResult};
use domain::{Password, User, UserRole, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};

use crate::client::UserDirectory;
use crate::config::AuthServiceConfig;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Never verifies; stands in for a missing account so unknown logins cost
/// the same hash parse as known ones.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiration time in seconds
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account
    async fn register(&self, username: String, email: String, password: String)
        -> AppResult<User>;

    /// Login by username or e-mail and return a JWT
    async fn login(&self, login: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// The active account behind a verified token
    async fn current_user(&self, user_id: Uuid) -> AppResult<User>;

    /// Issue and mail a reset token; unknown addresses succeed silently
    async fn forgot_password(&self, email: String) -> AppResult<()>;

    async fn reset_password(&self, token: String, new_password: String) -> AppResult<()>;

    /// Create an admin account, or promote the existing one with that username
    async fn seed_admin(&self, username: String, email: String, password: String)
        -> AppResult<User>;
}

/// Concrete implementation of AuthService over the user directory.
pub struct Authenticator {
    directory: Arc<dyn UserDirectory>,
    config: AuthServiceConfig,
    notifier: Notifier,
}

impl Authenticator {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        config: AuthServiceConfig,
        notifier: Notifier,
    ) -> Self {
        Self {
            directory,
            config,
            notifier,
        }
    }

    fn jwt_secret_bytes(&self) -> &[u8] {
        self.config.jwt.secret.as_bytes()
    }

    /// Generate JWT token for a user
    fn generate_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let hours = self.config.jwt.expiration_hours;
        let expires_at = now + Duration::hours(hours);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret_bytes()),
        )?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: hours * SECONDS_PER_HOUR,
        })
    }

    /// Username and e-mail must both be unused, deactivated accounts included.
    async fn ensure_unclaimed(&self, username: &str, email: &str) -> AppResult<()> {
        if self.directory.find_by_username(username).await?.is_some() {
            return Err(AppError::constraint("Username already exists"));
        }
        if self.directory.find_by_email(email).await?.is_some() {
            return Err(AppError::constraint("Email already exists"));
        }
        Ok(())
    }
}

fn normalize_username(username: String) -> AppResult<String> {
    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::validation("Username is required"));
    }
    Ok(username)
}

fn normalize_email(email: String) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    Ok(email)
}

fn generate_reset_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<User> {
        let username = normalize_username(username)?;
        let email = normalize_email(email)?;
        let password_hash = Password::new(&password)?.into_string();

        self.ensure_unclaimed(&username, &email).await?;

        let role = if self.directory.is_empty().await? || self.config.is_seed_admin(&username) {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let user = self
            .directory
            .create(NewUser {
                username,
                email,
                password_hash,
                role,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    async fn login(&self, login: String, password: String) -> AppResult<TokenResponse> {
        let found = self.directory.find_by_login(login.trim()).await?;

        // Verify even when the account is missing so response time does not
        // reveal which logins exist.
        let hash = found
            .as_ref()
            .map_or(DUMMY_HASH, |user| user.password_hash.as_str());
        let password_valid = Password::from_hash(hash).verify(&password);

        let user = match found {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        if !user.is_active {
            warn!(user_id = %user.id, "Login refused for deactivated account");
            return Err(AppError::InvalidCredentials);
        }

        self.directory.record_login(user.id, Utc::now()).await?;
        self.generate_token(&user)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn current_user(&self, user_id: Uuid) -> AppResult<User> {
        self.directory
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    async fn forgot_password(&self, email: String) -> AppResult<()> {
        let email = normalize_email(email)?;

        let user = match self.directory.find_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => {
                tracing::debug!("Password reset requested for unknown or inactive address");
                return Ok(());
            }
        };

        let ttl = self.config.reset_token_ttl_minutes;
        let token = generate_reset_token();
        self.directory
            .store_reset_token(user.id, token.clone(), Utc::now() + Duration::minutes(ttl))
            .await?;

        self.notifier.password_reset(&user.email, &token, ttl);
        info!(user_id = %user.id, "Password reset token issued");
        Ok(())
    }

    async fn reset_password(&self, token: String, new_password: String) -> AppResult<()> {
        let password_hash = Password::new(&new_password)?.into_string();

        let user = self
            .directory
            .find_by_reset_token(&token)
            .await?
            .filter(|user| user.is_active && user.reset_token_matches(&token, Utc::now()))
            .ok_or_else(|| AppError::validation("Invalid or expired reset token"))?;

        self.directory.set_password(user.id, password_hash).await?;
        info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    async fn seed_admin(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<User> {
        let username = normalize_username(username)?;

        if let Some(existing) = self.directory.find_by_username(&username).await? {
            if existing.is_admin() {
                info!(user_id = %existing.id, "Admin account already present");
                return Ok(existing);
            }
            let promoted = self.directory.promote(existing.id).await?;
            info!(user_id = %promoted.id, "Existing account promoted to admin");
            return Ok(promoted);
        }

        let email = normalize_email(email)?;
        let password_hash = Password::new(&password)?.into_string();
        self.ensure_unclaimed(&username, &email).await?;

        let user = self
            .directory
            .create(NewUser {
                username,
                email,
                password_hash,
                role: UserRole::Admin,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "Admin account created");
        Ok(user)
    }
}
