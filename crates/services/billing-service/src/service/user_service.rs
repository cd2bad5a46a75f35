//! User service - account administration.
//!
//! Registration and credentials live in the auth service. Soft delete,
//! restore and purge go through the lifecycle engine.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{ListScope, UpdateUser, User, UserRole};

use crate::repository::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user by ID, including deactivated ones
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn list_users(&self, scope: ListScope) -> AppResult<Vec<User>>;

    /// Change e-mail or role of an active user
    async fn update_user(&self, id: Uuid, acting_user_id: Uuid, data: UpdateUser)
        -> AppResult<User>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("User")
    }

    async fn list_users(&self, scope: ListScope) -> AppResult<Vec<User>> {
        self.repo.list(scope).await
    }

    async fn update_user(
        &self,
        id: Uuid,
        acting_user_id: Uuid,
        data: UpdateUser,
    ) -> AppResult<User> {
        let user = self.repo.find_by_id(id).await?.ok_or_not_found("User")?;

        if id == acting_user_id && user.is_admin() && data.role == Some(UserRole::User) {
            tracing::warn!(user_id = %id, "Refused admin self-demotion");
            return Err(AppError::SelfModificationForbidden(
                "You cannot remove your own admin role".to_string(),
            ));
        }

        let data = UpdateUser {
            email: data.email.map(|e| e.trim().to_lowercase()),
            ..data
        };
        if let Some(email) = &data.email {
            match self.repo.find_by_email(email).await? {
                Some(other) if other.id != id => {
                    return Err(AppError::constraint("Email is already in use"));
                }
                _ => {}
            }
        }

        self.repo.update(id, data).await
    }
}
