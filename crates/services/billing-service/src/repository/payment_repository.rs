//! Payment intent repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::payment_intent::{self, ActiveModel, Entity as PaymentEntity};
use common::{AppError, AppResult};
use domain::{Money, PaymentIntent};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Data for a payment intent just created at the processor.
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub external_intent_id: String,
    pub invoice_id: Uuid,
    pub office_id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: Money,
    pub currency: String,
    pub status: String,
}

/// Payment intent repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, data: NewPaymentIntent) -> AppResult<PaymentIntent>;

    async fn find_by_external_id(&self, external_intent_id: &str)
        -> AppResult<Option<PaymentIntent>>;

    /// List the intents recorded for an invoice, oldest first
    async fn list_for_invoice(&self, invoice_id: Uuid) -> AppResult<Vec<PaymentIntent>>;
}

/// Concrete implementation of PaymentRepository
pub struct PaymentStore {
    db: DatabaseConnection,
}

impl PaymentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentRepository for PaymentStore {
    async fn create(&self, data: NewPaymentIntent) -> AppResult<PaymentIntent> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            external_intent_id: Set(data.external_intent_id),
            invoice_id: Set(data.invoice_id),
            office_id: Set(data.office_id),
            user_id: Set(data.user_id),
            amount_cents: Set(data.amount.cents()),
            currency: Set(data.currency),
            status: Set(data.status),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(PaymentIntent::from(model))
    }

    async fn find_by_external_id(
        &self,
        external_intent_id: &str,
    ) -> AppResult<Option<PaymentIntent>> {
        let result = PaymentEntity::find()
            .filter(payment_intent::Column::ExternalIntentId.eq(external_intent_id))
            .one(&self.db)
            .await?;

        Ok(result.map(PaymentIntent::from))
    }

    async fn list_for_invoice(&self, invoice_id: Uuid) -> AppResult<Vec<PaymentIntent>> {
        let models = PaymentEntity::find()
            .filter(payment_intent::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payment_intent::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(PaymentIntent::from).collect())
    }
}

/// Store the latest processor status of an intent on the given connection.
pub(crate) async fn set_payment_status<C: ConnectionTrait>(
    conn: &C,
    external_intent_id: &str,
    status: &str,
) -> AppResult<PaymentIntent> {
    let intent = PaymentEntity::find()
        .filter(payment_intent::Column::ExternalIntentId.eq(external_intent_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Payment intent"))?;

    let mut active: ActiveModel = intent.into();
    active.status = Set(status.to_string());
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(conn).await.map_err(AppError::from)?;
    Ok(PaymentIntent::from(model))
}
