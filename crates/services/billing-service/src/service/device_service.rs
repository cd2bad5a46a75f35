//! Device service - Lune machines installed at offices.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{CreateDevice, Device, ListScope, UpdateDevice};

use super::validation;
use crate::repository::{DeviceRepository, OfficeRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Device service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DeviceService: Send + Sync {
    /// Register a device under an active office
    async fn create_device(&self, data: CreateDevice) -> AppResult<Device>;

    /// Get a device by ID, including soft-deleted ones
    async fn get_device(&self, id: Uuid) -> AppResult<Device>;

    /// List devices, optionally of one office
    async fn list_devices(&self, office_id: Option<Uuid>, scope: ListScope)
        -> AppResult<Vec<Device>>;

    /// Edit an active device; moving it requires an active target office
    async fn update_device(&self, id: Uuid, data: UpdateDevice) -> AppResult<Device>;
}

/// Concrete implementation of DeviceService using repositories.
pub struct DeviceManager {
    devices: Arc<dyn DeviceRepository>,
    offices: Arc<dyn OfficeRepository>,
}

impl DeviceManager {
    pub fn new(devices: Arc<dyn DeviceRepository>, offices: Arc<dyn OfficeRepository>) -> Self {
        Self { devices, offices }
    }

    async fn ensure_office_active(&self, office_id: Uuid) -> AppResult<()> {
        self.offices
            .find_by_id(office_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Office not found or deleted".to_string()))
    }

    async fn ensure_serial_free(&self, serial_number: &str, except: Option<Uuid>) -> AppResult<()> {
        match self.devices.find_by_serial_with_deleted(serial_number).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::constraint(format!(
                "A device with serial number {} already exists",
                serial_number
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DeviceService for DeviceManager {
    async fn create_device(&self, data: CreateDevice) -> AppResult<Device> {
        let data = CreateDevice {
            serial_number: validation::required("Serial number", data.serial_number)?,
            connected_phone: validation::required("Connected phone", data.connected_phone)?,
            sbc_identifier: validation::required("SBC identifier", data.sbc_identifier)?,
            ..data
        };

        self.ensure_office_active(data.office_id).await?;
        self.ensure_serial_free(&data.serial_number, None).await?;

        let device = self.devices.create(data).await?;
        tracing::info!(
            device_id = %device.id,
            office_id = %device.office_id,
            plan = device.plan_type.as_str(),
            "Device registered"
        );
        Ok(device)
    }

    async fn get_device(&self, id: Uuid) -> AppResult<Device> {
        self.devices
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("Device")
    }

    async fn list_devices(
        &self,
        office_id: Option<Uuid>,
        scope: ListScope,
    ) -> AppResult<Vec<Device>> {
        self.devices.list(office_id, scope).await
    }

    async fn update_device(&self, id: Uuid, data: UpdateDevice) -> AppResult<Device> {
        let data = UpdateDevice {
            serial_number: data
                .serial_number
                .map(|v| validation::required("Serial number", v))
                .transpose()?,
            connected_phone: data
                .connected_phone
                .map(|v| validation::required("Connected phone", v))
                .transpose()?,
            sbc_identifier: data
                .sbc_identifier
                .map(|v| validation::required("SBC identifier", v))
                .transpose()?,
            ..data
        };

        if let Some(office_id) = data.office_id {
            self.ensure_office_active(office_id).await?;
        }
        if let Some(serial_number) = &data.serial_number {
            self.ensure_serial_free(serial_number, Some(id)).await?;
        }

        self.devices.update(id, data).await
    }
}
