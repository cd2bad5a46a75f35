//! Migration: Create offices table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Offices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Offices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Offices::Name).string().not_null())
                    .col(ColumnDef::new(Offices::NpiId).string().not_null().unique_key())
                    .col(ColumnDef::new(Offices::State).string().not_null())
                    .col(ColumnDef::new(Offices::Town).string().not_null())
                    .col(ColumnDef::new(Offices::Address).string().not_null())
                    .col(ColumnDef::new(Offices::Phone).string().null())
                    .col(ColumnDef::new(Offices::Email).string().null())
                    .col(ColumnDef::new(Offices::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Offices::DeletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Offices::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Offices::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_offices_is_deleted")
                    .table(Offices::Table)
                    .col(Offices::IsDeleted)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Offices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Offices {
    Table,
    Id,
    Name,
    NpiId,
    State,
    Town,
    Address,
    Phone,
    Email,
    IsDeleted,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}
