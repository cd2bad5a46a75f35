//! Usage record repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::usage_record::{self, ActiveModel, Entity as UsageEntity};
use common::AppResult;
use domain::{UsageRecord, ValidatedUsage};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Usage record repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// List a device's usage records, newest first
    async fn list_for_device(&self, device_id: Uuid) -> AppResult<Vec<UsageRecord>>;

    /// Count a device's sessions with `from <= usage_date < until`
    async fn count_for_device_between(
        &self,
        device_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<u64>;
}

/// Concrete implementation of UsageRepository
pub struct UsageStore {
    db: DatabaseConnection,
}

impl UsageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsageRepository for UsageStore {
    async fn list_for_device(&self, device_id: Uuid) -> AppResult<Vec<UsageRecord>> {
        let models = UsageEntity::find()
            .filter(usage_record::Column::DeviceId.eq(device_id))
            .order_by_desc(usage_record::Column::StartTime)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(UsageRecord::from).collect())
    }

    async fn count_for_device_between(
        &self,
        device_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<u64> {
        let count = UsageEntity::find()
            .filter(usage_record::Column::DeviceId.eq(device_id))
            .filter(usage_record::Column::UsageDate.gte(from))
            .filter(usage_record::Column::UsageDate.lt(until))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}

/// Insert validated usage records on the given connection, in order.
pub(crate) async fn insert_usage_batch<C: ConnectionTrait>(
    conn: &C,
    records: Vec<ValidatedUsage>,
) -> AppResult<Vec<UsageRecord>> {
    let now = chrono::Utc::now();
    let mut inserted = Vec::with_capacity(records.len());

    for record in records {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            device_id: Set(record.device_id),
            button_number: Set(record.button_number),
            start_time: Set(record.start_time),
            end_time: Set(record.end_time),
            duration_seconds: Set(record.duration_seconds),
            usage_date: Set(record.usage_date),
            created_at: Set(now),
        };
        let model = active_model.insert(conn).await?;
        inserted.push(UsageRecord::from(model));
    }

    Ok(inserted)
}
