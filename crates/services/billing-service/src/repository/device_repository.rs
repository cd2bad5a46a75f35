//! Device repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::deleted_flag_filter;
use super::entities::device::{self, ActiveModel, Entity as DeviceEntity, Plan};
use common::{AppError, AppResult};
use domain::{CreateDevice, Device, ListScope, UpdateDevice};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Device repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Find active device by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Device>>;

    /// Find device by ID including soft-deleted
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Device>>;

    /// Find device by serial number including soft-deleted
    async fn find_by_serial_with_deleted(&self, serial_number: &str) -> AppResult<Option<Device>>;

    async fn create(&self, data: CreateDevice) -> AppResult<Device>;

    /// Update an active device
    async fn update(&self, id: Uuid, data: UpdateDevice) -> AppResult<Device>;

    /// List devices in the given scope, optionally restricted to one office
    async fn list(&self, office_id: Option<Uuid>, scope: ListScope) -> AppResult<Vec<Device>>;
}

/// Concrete implementation of DeviceRepository
pub struct DeviceStore {
    db: DatabaseConnection,
}

impl DeviceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeviceRepository for DeviceStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Device>> {
        let result = DeviceEntity::find_by_id(id)
            .filter(device::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;

        Ok(result.map(Device::from))
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Device>> {
        let result = DeviceEntity::find_by_id(id).one(&self.db).await?;

        Ok(result.map(Device::from))
    }

    async fn find_by_serial_with_deleted(&self, serial_number: &str) -> AppResult<Option<Device>> {
        let result = DeviceEntity::find()
            .filter(device::Column::SerialNumber.eq(serial_number))
            .one(&self.db)
            .await?;

        Ok(result.map(Device::from))
    }

    async fn create(&self, data: CreateDevice) -> AppResult<Device> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            serial_number: Set(data.serial_number),
            office_id: Set(data.office_id),
            purchase_date: Set(data.purchase_date),
            connected_phone: Set(data.connected_phone),
            sbc_identifier: Set(data.sbc_identifier),
            plan_type: Set(Plan::from(data.plan_type)),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Device::from(model))
    }

    async fn update(&self, id: Uuid, data: UpdateDevice) -> AppResult<Device> {
        let device = DeviceEntity::find_by_id(id)
            .filter(device::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Device"))?;

        let mut active: ActiveModel = device.into();

        if let Some(serial_number) = data.serial_number {
            active.serial_number = Set(serial_number);
        }
        if let Some(office_id) = data.office_id {
            active.office_id = Set(office_id);
        }
        if let Some(purchase_date) = data.purchase_date {
            active.purchase_date = Set(purchase_date);
        }
        if let Some(connected_phone) = data.connected_phone {
            active.connected_phone = Set(connected_phone);
        }
        if let Some(sbc_identifier) = data.sbc_identifier {
            active.sbc_identifier = Set(sbc_identifier);
        }
        if let Some(plan_type) = data.plan_type {
            active.plan_type = Set(Plan::from(plan_type));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Device::from(model))
    }

    async fn list(&self, office_id: Option<Uuid>, scope: ListScope) -> AppResult<Vec<Device>> {
        let mut query = DeviceEntity::find().order_by_asc(device::Column::SerialNumber);
        if let Some(office_id) = office_id {
            query = query.filter(device::Column::OfficeId.eq(office_id));
        }
        if let Some(deleted) = deleted_flag_filter(scope) {
            query = query.filter(device::Column::IsDeleted.eq(deleted));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Device::from).collect())
    }
}
