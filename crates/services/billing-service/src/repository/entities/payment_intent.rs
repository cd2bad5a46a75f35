//! Payment intent database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Money, PaymentIntent};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_intents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub external_intent_id: String,
    pub invoice_id: Uuid,
    pub office_id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PaymentIntent {
    fn from(model: Model) -> Self {
        PaymentIntent {
            id: model.id,
            external_intent_id: model.external_intent_id,
            invoice_id: model.invoice_id,
            office_id: model.office_id,
            user_id: model.user_id,
            amount: Money::from_cents(model.amount_cents),
            currency: model.currency,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
