//! Office repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::deleted_flag_filter;
use super::entities::office::{self, ActiveModel, Entity as OfficeEntity};
use common::{AppError, AppResult};
use domain::{CreateOffice, ListScope, Office, UpdateOffice};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Office repository trait for dependency injection.
///
/// Lookups exclude soft-deleted offices unless the method says otherwise.
/// State transitions belong to the lifecycle engine, not to this trait.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OfficeRepository: Send + Sync {
    /// Find active office by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Office>>;

    /// Find office by ID including soft-deleted
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Office>>;

    /// Find office by NPI including soft-deleted
    async fn find_by_npi_with_deleted(&self, npi_id: &str) -> AppResult<Option<Office>>;

    async fn create(&self, data: CreateOffice) -> AppResult<Office>;

    /// Update an active office
    async fn update(&self, id: Uuid, data: UpdateOffice) -> AppResult<Office>;

    /// List offices in the given scope, ordered by name
    async fn list(&self, scope: ListScope) -> AppResult<Vec<Office>>;
}

/// Concrete implementation of OfficeRepository
pub struct OfficeStore {
    db: DatabaseConnection,
}

impl OfficeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OfficeRepository for OfficeStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Office>> {
        let result = OfficeEntity::find_by_id(id)
            .filter(office::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;

        Ok(result.map(Office::from))
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Office>> {
        let result = OfficeEntity::find_by_id(id).one(&self.db).await?;

        Ok(result.map(Office::from))
    }

    async fn find_by_npi_with_deleted(&self, npi_id: &str) -> AppResult<Option<Office>> {
        let result = OfficeEntity::find()
            .filter(office::Column::NpiId.eq(npi_id))
            .one(&self.db)
            .await?;

        Ok(result.map(Office::from))
    }

    async fn create(&self, data: CreateOffice) -> AppResult<Office> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(data.name),
            npi_id: Set(data.npi_id),
            state: Set(data.state),
            town: Set(data.town),
            address: Set(data.address),
            phone: Set(data.phone),
            email: Set(data.email),
            is_deleted: Set(false),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Office::from(model))
    }

    async fn update(&self, id: Uuid, data: UpdateOffice) -> AppResult<Office> {
        let office = OfficeEntity::find_by_id(id)
            .filter(office::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Office"))?;

        let mut active: ActiveModel = office.into();

        if let Some(name) = data.name {
            active.name = Set(name);
        }
        if let Some(npi_id) = data.npi_id {
            active.npi_id = Set(npi_id);
        }
        if let Some(state) = data.state {
            active.state = Set(state);
        }
        if let Some(town) = data.town {
            active.town = Set(town);
        }
        if let Some(address) = data.address {
            active.address = Set(address);
        }
        if let Some(phone) = data.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = data.email {
            active.email = Set(Some(email));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Office::from(model))
    }

    async fn list(&self, scope: ListScope) -> AppResult<Vec<Office>> {
        let mut query = OfficeEntity::find().order_by_asc(office::Column::Name);
        if let Some(deleted) = deleted_flag_filter(scope) {
            query = query.filter(office::Column::IsDeleted.eq(deleted));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Office::from).collect())
    }
}
