//! Invoice database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Invoice, InvoiceStatus, Money};

/// Stored form of [`InvoiceStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Status {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl From<Status> for InvoiceStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Unpaid => InvoiceStatus::Unpaid,
            Status::Paid => InvoiceStatus::Paid,
        }
    }
}

impl From<InvoiceStatus> for Status {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Unpaid => Status::Unpaid,
            InvoiceStatus::Paid => Status::Paid,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub office_id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub month: i32,
    pub year: i32,
    pub total_amount_cents: i64,
    pub status: Status,
    pub generated_at: DateTimeUtc,
    pub paid_at: Option<DateTimeUtc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::office::Entity",
        from = "Column::OfficeId",
        to = "super::office::Column::Id"
    )]
    Office,
}

impl Related<super::office::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Office.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Invoice {
    fn from(model: Model) -> Self {
        Invoice {
            id: model.id,
            office_id: model.office_id,
            invoice_number: model.invoice_number,
            month: model.month,
            year: model.year,
            total_amount: Money::from_cents(model.total_amount_cents),
            status: model.status.into(),
            generated_at: model.generated_at,
            paid_at: model.paid_at,
            is_deleted: model.is_deleted,
            deleted_at: model.deleted_at,
        }
    }
}
