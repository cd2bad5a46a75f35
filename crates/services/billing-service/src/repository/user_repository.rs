//! User repository implementation.
//!
//! Users are soft-deleted by clearing `is_active`; lookups used for
//! authentication therefore return inactive users too and leave the
//! decision to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{ListScope, UpdateUser, User, UserRole};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Data for a new account; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find active user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by ID including deactivated
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by username or e-mail, including deactivated
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Find user by e-mail, including deactivated
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by username, including deactivated
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find user holding the given password reset token
    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>>;

    /// Number of accounts ever created and not purged
    async fn count(&self) -> AppResult<u64>;

    async fn create(&self, data: NewUser) -> AppResult<User>;

    /// Update e-mail and role of an active user
    async fn update(&self, id: Uuid, data: UpdateUser) -> AppResult<User>;

    async fn set_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Store or clear a password reset token
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Replace the password hash and clear any reset token
    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// List users in the given scope, ordered by username
    async fn list(&self, scope: ListScope) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;

        Ok(result.map(User::from))
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(login))
                    .add(user::Column::Email.eq(login)),
            )
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::ResetToken.eq(token))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(UserEntity::find().count(&self.db).await?)
    }

    async fn create(&self, data: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(data.username),
            email: Set(data.email),
            password_hash: Set(data.password_hash),
            role: Set(data.role.to_string()),
            is_active: Set(true),
            last_login: Set(None),
            reset_token: Set(None),
            reset_token_expiry: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, data: UpdateUser) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .filter(user::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let mut active: ActiveModel = user.into();

        if let Some(email) = data.email {
            active.email = Set(email);
        }
        if let Some(role) = data.role {
            active.role = Set(role.to_string());
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn set_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut active: ActiveModel = self.load(id).await?.into();
        active.last_login = Set(Some(at));

        active.update(&self.db).await?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut active: ActiveModel = self.load(id).await?.into();
        active.reset_token = Set(token);
        active.reset_token_expiry = Set(expires_at);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = self.load(id).await?.into();
        active.password_hash = Set(password_hash);
        active.reset_token = Set(None);
        active.reset_token_expiry = Set(None);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }

    async fn list(&self, scope: ListScope) -> AppResult<Vec<User>> {
        let mut query = UserEntity::find().order_by_asc(user::Column::Username);
        match scope {
            ListScope::Active => query = query.filter(user::Column::IsActive.eq(true)),
            ListScope::Deleted => query = query.filter(user::Column::IsActive.eq(false)),
            ListScope::All => {}
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(User::from).collect())
    }
}
