//! Invoice repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::deleted_flag_filter;
use super::entities::invoice::{self, ActiveModel, Entity as InvoiceEntity, Status};
use common::{AppError, AppResult};
use domain::{Invoice, InvoiceFigures, InvoiceStatus, ListScope, Money};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Data for a freshly generated invoice.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub office_id: Uuid,
    pub invoice_number: String,
    pub month: i32,
    pub year: i32,
    pub total_amount: Money,
}

/// Invoice repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Find active invoice by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invoice>>;

    /// Find invoice by ID including soft-deleted
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Invoice>>;

    /// Find the invoice of an office for a month, including soft-deleted
    async fn find_for_period(&self, office_id: Uuid, month: i32, year: i32)
        -> AppResult<Option<Invoice>>;

    async fn create(&self, data: NewInvoice) -> AppResult<Invoice>;

    /// Set the payment status of an active invoice
    async fn set_status(&self, id: Uuid, status: InvoiceStatus) -> AppResult<Invoice>;

    /// List invoices in the given scope, newest period first
    async fn list(&self, office_id: Option<Uuid>, scope: ListScope) -> AppResult<Vec<Invoice>>;

    /// Amount, status and age of the active invoices of the given offices
    async fn figures_for_offices(&self, office_ids: &[Uuid])
        -> AppResult<Vec<(Uuid, InvoiceFigures)>>;
}

/// Concrete implementation of InvoiceRepository
pub struct InvoiceStore {
    db: DatabaseConnection,
}

impl InvoiceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvoiceRepository for InvoiceStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invoice>> {
        let result = InvoiceEntity::find_by_id(id)
            .filter(invoice::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;

        Ok(result.map(Invoice::from))
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Invoice>> {
        let result = InvoiceEntity::find_by_id(id).one(&self.db).await?;

        Ok(result.map(Invoice::from))
    }

    async fn find_for_period(
        &self,
        office_id: Uuid,
        month: i32,
        year: i32,
    ) -> AppResult<Option<Invoice>> {
        let result = InvoiceEntity::find()
            .filter(invoice::Column::OfficeId.eq(office_id))
            .filter(invoice::Column::Month.eq(month))
            .filter(invoice::Column::Year.eq(year))
            .one(&self.db)
            .await?;

        Ok(result.map(Invoice::from))
    }

    async fn create(&self, data: NewInvoice) -> AppResult<Invoice> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            office_id: Set(data.office_id),
            invoice_number: Set(data.invoice_number),
            month: Set(data.month),
            year: Set(data.year),
            total_amount_cents: Set(data.total_amount.cents()),
            status: Set(Status::Unpaid),
            generated_at: Set(chrono::Utc::now()),
            paid_at: Set(None),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Invoice::from(model))
    }

    async fn set_status(&self, id: Uuid, status: InvoiceStatus) -> AppResult<Invoice> {
        set_invoice_status(&self.db, id, status).await
    }

    async fn list(&self, office_id: Option<Uuid>, scope: ListScope) -> AppResult<Vec<Invoice>> {
        let mut query = InvoiceEntity::find()
            .order_by_desc(invoice::Column::Year)
            .order_by_desc(invoice::Column::Month)
            .order_by_asc(invoice::Column::InvoiceNumber);
        if let Some(office_id) = office_id {
            query = query.filter(invoice::Column::OfficeId.eq(office_id));
        }
        if let Some(deleted) = deleted_flag_filter(scope) {
            query = query.filter(invoice::Column::IsDeleted.eq(deleted));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Invoice::from).collect())
    }

    async fn figures_for_offices(
        &self,
        office_ids: &[Uuid],
    ) -> AppResult<Vec<(Uuid, InvoiceFigures)>> {
        if office_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = InvoiceEntity::find()
            .filter(invoice::Column::OfficeId.is_in(office_ids.iter().copied()))
            .filter(invoice::Column::IsDeleted.eq(false))
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| {
                (
                    m.office_id,
                    InvoiceFigures {
                        amount: Money::from_cents(m.total_amount_cents),
                        status: m.status.into(),
                        generated_at: m.generated_at,
                    },
                )
            })
            .collect())
    }
}

/// Set the payment status of an active invoice on the given connection.
///
/// `paid_at` is stamped when the invoice becomes paid and cleared when it
/// goes back to unpaid.
pub(crate) async fn set_invoice_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: InvoiceStatus,
) -> AppResult<Invoice> {
    let invoice = InvoiceEntity::find_by_id(id)
        .filter(invoice::Column::IsDeleted.eq(false))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice"))?;

    let mut active: ActiveModel = invoice.into();
    active.status = Set(Status::from(status));
    active.paid_at = Set(status.is_paid().then(chrono::Utc::now));

    let model = active.update(conn).await.map_err(AppError::from)?;
    Ok(Invoice::from(model))
}
