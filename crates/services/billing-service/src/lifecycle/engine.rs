//! Generic soft-delete / restore / purge engine.
//!
//! Every transition runs in a single transaction: the row, its cascaded
//! children and every purge step commit together or not at all.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Alias, DeleteStatement, Expr, Query, SelectStatement, UpdateStatement};
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbErr};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::descriptor::{descriptor, EntityDescriptor, PurgeStep};
use crate::infra::Persistence;
use domain::{EntityKind, LifecycleError, LifecycleResult, LifecycleState, PurgedEntity};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const ID_COLUMN: &str = "id";

/// Lifecycle operations shared by offices, devices, invoices and users.
///
/// Callers are expected to have checked the acting user's capabilities:
/// soft and permanent delete are admin operations, restore only needs an
/// authenticated user.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Active -> SoftDeleted, cascading onto children.
    async fn soft_delete(&self, kind: EntityKind, id: Uuid, acting_user_id: Uuid)
        -> LifecycleResult<()>;

    /// SoftDeleted -> Active, cascading onto children.
    async fn restore(&self, kind: EntityKind, id: Uuid) -> LifecycleResult<()>;

    /// Active|SoftDeleted -> Gone, removing dependent rows first.
    async fn permanent_delete(
        &self,
        kind: EntityKind,
        id: Uuid,
        acting_user_id: Uuid,
    ) -> LifecycleResult<PurgedEntity>;

    /// Current state; rows that do not exist report `Gone`.
    async fn state_of(&self, kind: EntityKind, id: Uuid) -> LifecycleResult<LifecycleState>;
}

/// What the engine reads about a row before transitioning it.
#[derive(Debug)]
struct RowSnapshot {
    deleted: bool,
    display_name: String,
    protected: bool,
}

/// Descriptor-driven implementation of [`Lifecycle`].
pub struct LifecycleEngine {
    persistence: Persistence,
}

impl LifecycleEngine {
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }

    async fn begin(&self, kind: EntityKind) -> LifecycleResult<DatabaseTransaction> {
        self.persistence
            .begin()
            .await
            .map_err(|e| store_failure(kind, "begin transaction", e))
    }

    /// Commit on success, roll back on failure.
    async fn finish<T>(
        kind: EntityKind,
        txn: DatabaseTransaction,
        result: LifecycleResult<T>,
    ) -> LifecycleResult<T> {
        match result {
            Ok(value) => {
                txn.commit()
                    .await
                    .map_err(|e| store_failure(kind, "commit", e))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    fn check_self_guard(
        desc: &EntityDescriptor,
        id: Uuid,
        acting_user_id: Uuid,
    ) -> LifecycleResult<()> {
        if desc.self_guarded && id == acting_user_id {
            warn!(entity = %desc.kind, %id, "Refused self-deletion");
            return Err(LifecycleError::SelfModificationForbidden);
        }
        Ok(())
    }

    async fn soft_delete_in(
        txn: &DatabaseTransaction,
        desc: &EntityDescriptor,
        id: Uuid,
    ) -> LifecycleResult<u64> {
        let row = load_row(txn, desc, id)
            .await
            .map_err(|e| store_failure(desc.kind, "load", e))?
            .ok_or(LifecycleError::NotFound { entity: desc.kind, id })?;

        if row.deleted {
            return Err(LifecycleError::AlreadyDeleted { entity: desc.kind, id });
        }

        let flipped = execute(txn, &set_flag(desc, id, true))
            .await
            .map_err(|e| store_failure(desc.kind, "soft delete", e))?;
        if flipped == 0 {
            // Lost a race with a concurrent delete
            return Err(LifecycleError::AlreadyDeleted { entity: desc.kind, id });
        }

        let mut cascaded = 0;
        for child in desc.cascade {
            let stmt = Query::update()
                .table(Alias::new(child.table))
                .value(Alias::new(child.flag.column), child.flag.deleted_value)
                .and_where(Expr::col(Alias::new(child.foreign_key)).eq(id))
                .and_where(Expr::col(Alias::new(child.flag.column)).eq(child.flag.active_value()))
                .to_owned();
            cascaded += execute(txn, &stmt)
                .await
                .map_err(|e| store_failure(desc.kind, "cascade soft delete", e))?;
        }

        Ok(cascaded)
    }

    async fn restore_in(
        txn: &DatabaseTransaction,
        desc: &EntityDescriptor,
        id: Uuid,
    ) -> LifecycleResult<u64> {
        let row = load_row(txn, desc, id)
            .await
            .map_err(|e| store_failure(desc.kind, "load", e))?
            .ok_or(LifecycleError::NotFound { entity: desc.kind, id })?;

        if !row.deleted {
            return Err(LifecycleError::NotDeleted { entity: desc.kind, id });
        }

        let flipped = execute(txn, &set_flag(desc, id, false))
            .await
            .map_err(|e| store_failure(desc.kind, "restore", e))?;
        if flipped == 0 {
            return Err(LifecycleError::NotDeleted { entity: desc.kind, id });
        }

        // Every soft-deleted child comes back, including children that were
        // deleted on their own before the parent.
        let mut cascaded = 0;
        for child in desc.cascade {
            let stmt = Query::update()
                .table(Alias::new(child.table))
                .value(Alias::new(child.flag.column), child.flag.active_value())
                .and_where(Expr::col(Alias::new(child.foreign_key)).eq(id))
                .and_where(Expr::col(Alias::new(child.flag.column)).eq(child.flag.deleted_value))
                .to_owned();
            cascaded += execute(txn, &stmt)
                .await
                .map_err(|e| store_failure(desc.kind, "cascade restore", e))?;
        }

        Ok(cascaded)
    }

    async fn purge_in(
        txn: &DatabaseTransaction,
        desc: &EntityDescriptor,
        id: Uuid,
    ) -> LifecycleResult<PurgedEntity> {
        let row = load_row(txn, desc, id)
            .await
            .map_err(|e| store_failure(desc.kind, "load", e))?
            .ok_or(LifecycleError::NotFound { entity: desc.kind, id })?;

        if row.protected {
            warn!(entity = %desc.kind, %id, "Refused to purge protected row");
            return Err(LifecycleError::AdminProtected { id });
        }

        for step in desc.purge_order {
            let removed = execute_delete(txn, &purge_statement(step, id))
                .await
                .map_err(|e| store_failure(desc.kind, step.table(), e))?;
            info!(entity = %desc.kind, %id, table = step.table(), removed, "Purged dependent rows");
        }

        let stmt = Query::delete()
            .from_table(Alias::new(desc.table))
            .and_where(Expr::col(Alias::new(ID_COLUMN)).eq(id))
            .to_owned();
        let removed = execute_delete(txn, &stmt)
            .await
            .map_err(|e| store_failure(desc.kind, desc.table, e))?;
        if removed == 0 {
            return Err(LifecycleError::NotFound { entity: desc.kind, id });
        }

        Ok(PurgedEntity { id, display_name: row.display_name })
    }
}

#[async_trait]
impl Lifecycle for LifecycleEngine {
    async fn soft_delete(
        &self,
        kind: EntityKind,
        id: Uuid,
        acting_user_id: Uuid,
    ) -> LifecycleResult<()> {
        let desc = descriptor(kind);
        Self::check_self_guard(desc, id, acting_user_id)?;

        let txn = self.begin(kind).await?;
        let result = Self::soft_delete_in(&txn, desc, id).await;
        let cascaded = Self::finish(kind, txn, result).await?;

        info!(entity = %kind, %id, %acting_user_id, cascaded, "Soft deleted");
        Ok(())
    }

    async fn restore(&self, kind: EntityKind, id: Uuid) -> LifecycleResult<()> {
        let desc = descriptor(kind);

        let txn = self.begin(kind).await?;
        let result = Self::restore_in(&txn, desc, id).await;
        let cascaded = Self::finish(kind, txn, result).await?;

        info!(entity = %kind, %id, cascaded, "Restored");
        Ok(())
    }

    async fn permanent_delete(
        &self,
        kind: EntityKind,
        id: Uuid,
        acting_user_id: Uuid,
    ) -> LifecycleResult<PurgedEntity> {
        let desc = descriptor(kind);
        Self::check_self_guard(desc, id, acting_user_id)?;

        let txn = self.begin(kind).await?;
        let result = Self::purge_in(&txn, desc, id).await;
        let purged = Self::finish(kind, txn, result).await?;

        info!(entity = %kind, %id, %acting_user_id, name = %purged.display_name, "Permanently deleted");
        Ok(purged)
    }

    async fn state_of(&self, kind: EntityKind, id: Uuid) -> LifecycleResult<LifecycleState> {
        let desc = descriptor(kind);
        let row = load_row(self.persistence.connection(), desc, id)
            .await
            .map_err(|e| store_failure(kind, "load", e))?;

        Ok(match row {
            Some(row) => LifecycleState::from_deleted_flag(row.deleted),
            None => LifecycleState::Gone,
        })
    }
}

fn store_failure(kind: EntityKind, step: &str, err: DbErr) -> LifecycleError {
    error!(entity = %kind, step, error = %err, "Lifecycle store operation failed");
    LifecycleError::dependency(format!("{} {}: {}", kind, step, err))
}

async fn load_row<C: ConnectionTrait>(
    conn: &C,
    desc: &EntityDescriptor,
    id: Uuid,
) -> Result<Option<RowSnapshot>, DbErr> {
    let mut select: SelectStatement = Query::select()
        .column(Alias::new(desc.flag.column))
        .column(Alias::new(desc.display_column))
        .from(Alias::new(desc.table))
        .and_where(Expr::col(Alias::new(ID_COLUMN)).eq(id))
        .to_owned();
    if let Some(protected) = desc.protected {
        select.column(Alias::new(protected.column));
    }

    let backend = conn.get_database_backend();
    let Some(row) = conn.query_one(backend.build(&select)).await? else {
        return Ok(None);
    };

    let flag: bool = row.try_get("", desc.flag.column)?;
    let display_name: String = row.try_get("", desc.display_column)?;
    let protected = match desc.protected {
        Some(rule) => row.try_get::<String>("", rule.column)? == rule.value,
        None => false,
    };

    Ok(Some(RowSnapshot {
        deleted: flag == desc.flag.deleted_value,
        display_name,
        protected,
    }))
}

/// `UPDATE table SET flag = .., deleted_at = .. WHERE id = :id AND flag = <current>`
fn set_flag(desc: &EntityDescriptor, id: Uuid, deleted: bool) -> UpdateStatement {
    let (from, to) = if deleted {
        (desc.flag.active_value(), desc.flag.deleted_value)
    } else {
        (desc.flag.deleted_value, desc.flag.active_value())
    };
    let now = Utc::now();

    let mut stmt = Query::update()
        .table(Alias::new(desc.table))
        .value(Alias::new(desc.flag.column), to)
        .and_where(Expr::col(Alias::new(ID_COLUMN)).eq(id))
        .and_where(Expr::col(Alias::new(desc.flag.column)).eq(from))
        .to_owned();
    if let Some(column) = desc.deleted_at {
        stmt.value(Alias::new(column), deleted.then_some(now));
    }
    if let Some(column) = desc.updated_at {
        stmt.value(Alias::new(column), now);
    }
    stmt
}

fn purge_statement(step: &PurgeStep, id: Uuid) -> DeleteStatement {
    match *step {
        PurgeStep::Direct { table, column } => Query::delete()
            .from_table(Alias::new(table))
            .and_where(Expr::col(Alias::new(column)).eq(id))
            .to_owned(),
        PurgeStep::Through { table, column, parent_table, parent_fk } => Query::delete()
            .from_table(Alias::new(table))
            .and_where(
                Expr::col(Alias::new(column)).in_subquery(
                    Query::select()
                        .column(Alias::new(ID_COLUMN))
                        .from(Alias::new(parent_table))
                        .and_where(Expr::col(Alias::new(parent_fk)).eq(id))
                        .to_owned(),
                ),
            )
            .to_owned(),
    }
}

async fn execute<C: ConnectionTrait>(conn: &C, stmt: &UpdateStatement) -> Result<u64, DbErr> {
    let backend = conn.get_database_backend();
    Ok(conn.execute(backend.build(stmt)).await?.rows_affected())
}

async fn execute_delete<C: ConnectionTrait>(conn: &C, stmt: &DeleteStatement) -> Result<u64, DbErr> {
    let backend = conn.get_database_backend();
    Ok(conn.execute(backend.build(stmt)).await?.rows_affected())
}
