//! Usage record database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::UsageRecord;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usage_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub device_id: Uuid,
    pub button_number: i32,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub duration_seconds: i64,
    pub usage_date: Date,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::device::Entity",
        from = "Column::DeviceId",
        to = "super::device::Column::Id"
    )]
    Device,
}

impl Related<super::device::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UsageRecord {
    fn from(model: Model) -> Self {
        UsageRecord {
            id: model.id,
            device_id: model.device_id,
            button_number: model.button_number,
            start_time: model.start_time,
            end_time: model.end_time,
            duration_seconds: model.duration_seconds,
            usage_date: model.usage_date,
            created_at: model.created_at,
        }
    }
}
