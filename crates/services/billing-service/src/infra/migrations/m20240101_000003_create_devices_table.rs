//! Migration: Create devices table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Devices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Devices::SerialNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Devices::OfficeId).uuid().not_null())
                    .col(ColumnDef::new(Devices::PurchaseDate).date().not_null())
                    .col(ColumnDef::new(Devices::ConnectedPhone).string().not_null())
                    .col(ColumnDef::new(Devices::SbcIdentifier).string().not_null())
                    .col(ColumnDef::new(Devices::PlanType).string().not_null())
                    .col(ColumnDef::new(Devices::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Devices::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Devices::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devices_office_id")
                            .from(Devices::Table, Devices::OfficeId)
                            .to(Offices::Table, Offices::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_devices_office_id")
                    .table(Devices::Table)
                    .col(Devices::OfficeId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Devices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Devices {
    Table,
    Id,
    SerialNumber,
    OfficeId,
    PurchaseDate,
    ConnectedPhone,
    SbcIdentifier,
    PlanType,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Offices {
    Table,
    Id,
}
