//! Migration: Create payment_intents table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentIntents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PaymentIntents::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(PaymentIntents::ExternalIntentId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PaymentIntents::InvoiceId).uuid().not_null())
                    .col(ColumnDef::new(PaymentIntents::OfficeId).uuid().not_null())
                    .col(ColumnDef::new(PaymentIntents::UserId).uuid().null())
                    .col(ColumnDef::new(PaymentIntents::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(PaymentIntents::Currency).string().not_null())
                    .col(ColumnDef::new(PaymentIntents::Status).string().not_null())
                    .col(ColumnDef::new(PaymentIntents::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(PaymentIntents::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_intents_invoice_id")
                            .from(PaymentIntents::Table, PaymentIntents::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_intents_office_id")
                            .from(PaymentIntents::Table, PaymentIntents::OfficeId)
                            .to(Offices::Table, Offices::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_intents_user_id")
                            .from(PaymentIntents::Table, PaymentIntents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_intents_invoice_id")
                    .table(PaymentIntents::Table)
                    .col(PaymentIntents::InvoiceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentIntents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PaymentIntents {
    Table,
    Id,
    ExternalIntentId,
    InvoiceId,
    OfficeId,
    UserId,
    AmountCents,
    Currency,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
}

#[derive(Iden)]
enum Offices {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
