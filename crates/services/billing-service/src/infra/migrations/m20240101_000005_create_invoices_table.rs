//! Migration: Create invoices table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Invoices::OfficeId).uuid().not_null())
                    .col(ColumnDef::new(Invoices::InvoiceNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Invoices::Month).integer().not_null())
                    .col(ColumnDef::new(Invoices::Year).integer().not_null())
                    .col(ColumnDef::new(Invoices::TotalAmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Invoices::Status).string().not_null().default("unpaid"))
                    .col(ColumnDef::new(Invoices::GeneratedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Invoices::PaidAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Invoices::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Invoices::DeletedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_office_id")
                            .from(Invoices::Table, Invoices::OfficeId)
                            .to(Offices::Table, Offices::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_office_period")
                    .table(Invoices::Table)
                    .col(Invoices::OfficeId)
                    .col(Invoices::Year)
                    .col(Invoices::Month)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    OfficeId,
    InvoiceNumber,
    Month,
    Year,
    TotalAmountCents,
    Status,
    GeneratedAt,
    PaidAt,
    IsDeleted,
    DeletedAt,
}

#[derive(Iden)]
enum Offices {
    Table,
    Id,
}
