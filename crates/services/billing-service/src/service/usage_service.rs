//! Usage service - ingestion of device session logs.
//!
//! Single and bulk ingestion share one path: every record is validated
//! before anything is written, and the batch is inserted in one transaction.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{NewUsageRecord, UsageRecord, ValidatedUsage};

use crate::infra::Persistence;
use crate::repository::{insert_usage_batch, DeviceRepository, UsageRepository};
use crate::with_transaction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Usage service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UsageService: Send + Sync {
    /// Record one session
    async fn record(&self, record: NewUsageRecord) -> AppResult<UsageRecord>;

    /// Record a batch of sessions, all or nothing
    async fn record_bulk(&self, records: Vec<NewUsageRecord>) -> AppResult<Vec<UsageRecord>>;

    /// Sessions of a device, newest first
    async fn list_for_device(&self, device_id: Uuid) -> AppResult<Vec<UsageRecord>>;
}

/// Concrete implementation of UsageService.
pub struct UsageManager {
    persistence: Persistence,
    usage: Arc<dyn UsageRepository>,
    devices: Arc<dyn DeviceRepository>,
}

impl UsageManager {
    pub fn new(
        persistence: Persistence,
        usage: Arc<dyn UsageRepository>,
        devices: Arc<dyn DeviceRepository>,
    ) -> Self {
        Self {
            persistence,
            usage,
            devices,
        }
    }

    async fn ensure_devices_active(&self, records: &[ValidatedUsage]) -> AppResult<()> {
        let device_ids: BTreeSet<Uuid> = records.iter().map(|r| r.device_id).collect();
        for device_id in device_ids {
            if self.devices.find_by_id(device_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "Device {} not found or deleted",
                    device_id
                )));
            }
        }
        Ok(())
    }

    async fn insert(&self, records: Vec<ValidatedUsage>) -> AppResult<Vec<UsageRecord>> {
        self.ensure_devices_active(&records).await?;

        let count = records.len();
        let inserted = with_transaction!(self.persistence, |ctx| {
            insert_usage_batch(ctx.conn(), records).await
        })?;

        tracing::info!(count, "Usage records stored");
        Ok(inserted)
    }
}

/// Validate every record, reporting the first failure by position.
fn validate_batch(records: &[NewUsageRecord]) -> AppResult<Vec<ValidatedUsage>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record.validate().map_err(|e| match AppError::from(e) {
                AppError::Validation(msg) if records.len() > 1 => {
                    AppError::Validation(format!("Record {}: {}", index + 1, msg))
                }
                other => other,
            })
        })
        .collect()
}

#[async_trait]
impl UsageService for UsageManager {
    async fn record(&self, record: NewUsageRecord) -> AppResult<UsageRecord> {
        let validated = record.validate()?;
        self.insert(vec![validated])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("Usage insert returned no row"))
    }

    async fn record_bulk(&self, records: Vec<NewUsageRecord>) -> AppResult<Vec<UsageRecord>> {
        if records.is_empty() {
            return Err(AppError::validation("At least one usage record is required"));
        }

        let validated = validate_batch(&records)?;
        self.insert(validated).await
    }

    async fn list_for_device(&self, device_id: Uuid) -> AppResult<Vec<UsageRecord>> {
        self.usage.list_for_device(device_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn session(offset_secs: i64) -> NewUsageRecord {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        NewUsageRecord {
            device_id: Uuid::new_v4(),
            button_number: 1,
            start_time: start,
            end_time: start + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_validate_batch_reports_position_of_bad_record() {
        let batch = vec![session(60), session(60), session(0), session(60), session(60)];

        let err = validate_batch(&batch).unwrap_err();

        match err {
            AppError::Validation(msg) => assert!(msg.starts_with("Record 3:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_batch_derives_durations() {
        let validated = validate_batch(&[session(90), session(30)]).unwrap();
        let durations: Vec<_> = validated.iter().map(|v| v.duration_seconds).collect();
        assert_eq!(durations, vec![90, 30]);
    }
}
