//! Migration: Create usage_records table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsageRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UsageRecords::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UsageRecords::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(UsageRecords::ButtonNumber).integer().not_null())
                    .col(ColumnDef::new(UsageRecords::StartTime).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(UsageRecords::EndTime).timestamp_with_time_zone().not_null())
                    .col(
                        ColumnDef::new(UsageRecords::DurationSeconds)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(UsageRecords::DurationSeconds).gt(0)),
                    )
                    .col(ColumnDef::new(UsageRecords::UsageDate).date().not_null())
                    .col(ColumnDef::new(UsageRecords::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usage_records_device_id")
                            .from(UsageRecords::Table, UsageRecords::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_usage_records_device_date")
                    .table(UsageRecords::Table)
                    .col(UsageRecords::DeviceId)
                    .col(UsageRecords::UsageDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UsageRecords {
    Table,
    Id,
    DeviceId,
    ButtonNumber,
    StartTime,
    EndTime,
    DurationSeconds,
    UsageDate,
    CreatedAt,
}

#[derive(Iden)]
enum Devices {
    Table,
    Id,
}
