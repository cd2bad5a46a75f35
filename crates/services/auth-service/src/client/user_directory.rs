//! User directory backed by the billing user store.
//!
//! The auth service runs in the same process as the billing service and
//! reads accounts straight from its repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use billing_service::repository::{NewUser, UserRepository};
use common::AppResult;
use domain::{UpdateUser, User, UserRole};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Trait for user operations needed by auth-service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find active user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by username or e-mail, including deactivated
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Find user by e-mail, including deactivated
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by username, including deactivated
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>>;

    /// Whether no account has been created yet
    async fn is_empty(&self) -> AppResult<bool>;

    async fn create(&self, data: NewUser) -> AppResult<User>;

    /// Give an active account the admin role
    async fn promote(&self, id: Uuid) -> AppResult<User>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    async fn store_reset_token(
        &self,
        id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Replace the password hash; clears any pending reset token
    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;
}

/// UserDirectory over the shared user repository.
pub struct RepositoryDirectory {
    users: Arc<dyn UserRepository>,
}

impl RepositoryDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for RepositoryDirectory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        self.users.find_by_login(login).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>> {
        self.users.find_by_reset_token(token).await
    }

    async fn is_empty(&self) -> AppResult<bool> {
        Ok(self.users.count().await? == 0)
    }

    async fn create(&self, data: NewUser) -> AppResult<User> {
        self.users.create(data).await
    }

    async fn promote(&self, id: Uuid) -> AppResult<User> {
        self.users
            .update(
                id,
                UpdateUser {
                    email: None,
                    role: Some(UserRole::Admin),
                },
            )
            .await
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.users.set_last_login(id, at).await
    }

    async fn store_reset_token(
        &self,
        id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.users
            .set_reset_token(id, Some(token), Some(expires_at))
            .await
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        self.users.set_password(id, password_hash).await
    }
}
