//! Device database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Device, PlanType};

/// Stored form of [`PlanType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Plan {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "per_session")]
    PerSession,
}

impl From<Plan> for PlanType {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Monthly => PlanType::Monthly,
            Plan::PerSession => PlanType::PerSession,
        }
    }
}

impl From<PlanType> for Plan {
    fn from(plan: PlanType) -> Self {
        match plan {
            PlanType::Monthly => Plan::Monthly,
            PlanType::PerSession => Plan::PerSession,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub office_id: Uuid,
    pub purchase_date: Date,
    pub connected_phone: String,
    pub sbc_identifier: String,
    pub plan_type: Plan,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::office::Entity",
        from = "Column::OfficeId",
        to = "super::office::Column::Id"
    )]
    Office,
    #[sea_orm(has_many = "super::usage_record::Entity")]
    UsageRecord,
}

impl Related<super::office::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Office.def()
    }
}

impl Related<super::usage_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Device {
    fn from(model: Model) -> Self {
        Device {
            id: model.id,
            serial_number: model.serial_number,
            office_id: model.office_id,
            purchase_date: model.purchase_date,
            connected_phone: model.connected_phone,
            sbc_identifier: model.sbc_identifier,
            plan_type: model.plan_type.into(),
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
