//! Unit of Work: transaction lifecycle for multi-step writes.
//!
//! Cascading lifecycle transitions, bulk usage ingestion and payment
//! reconciliation all run through here so that readers only ever observe
//! the state before or after the whole operation.

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr,
    IsolationLevel, TransactionTrait,
};

use common::{AppError, AppResult};

/// Transaction context handed to closures run by [`Persistence::transaction`].
///
/// Every statement issued through the context is part of the same
/// database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Connection to issue statements on.
    pub fn conn(&self) -> &'a DatabaseTransaction {
        self.txn
    }
}

/// Transaction manager over the shared connection pool.
#[derive(Clone)]
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Begin a read-write transaction.
    ///
    /// Postgres runs at ReadCommitted. SQLite transactions are serialized by
    /// the engine and take no isolation settings.
    pub async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        match self.db.get_database_backend() {
            DatabaseBackend::Sqlite => self.db.begin().await,
            _ => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::ReadCommitted),
                        Some(AccessMode::ReadWrite),
                    )
                    .await
            }
        }
    }

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success or rolled back on error.
    pub async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self.begin().await.map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Run a block inside [`Persistence::transaction`].
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Database;
    use sea_orm::Statement;

    async fn scratch() -> Persistence {
        let db = Database::in_memory().await.unwrap();
        db.connection()
            .execute_unprepared("CREATE TABLE scratch (n INTEGER NOT NULL)")
            .await
            .unwrap();
        Persistence::new(db.get_connection())
    }

    async fn rows(persistence: &Persistence) -> i64 {
        let conn = persistence.connection();
        let row = conn
            .query_one(Statement::from_string(
                conn.get_database_backend(),
                "SELECT COUNT(*) AS n FROM scratch",
            ))
            .await
            .unwrap()
            .unwrap();
        row.try_get::<i64>("", "n").unwrap()
    }

    #[tokio::test]
    async fn test_transaction_commits_on_success() {
        let persistence = scratch().await;

        let result: AppResult<()> = with_transaction!(persistence, |ctx| {
            ctx.conn()
                .execute_unprepared("INSERT INTO scratch (n) VALUES (1), (2)")
                .await?;
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(rows(&persistence).await, 2);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_error() {
        let persistence = scratch().await;

        let result: AppResult<()> = with_transaction!(persistence, |ctx| {
            ctx.conn()
                .execute_unprepared("INSERT INTO scratch (n) VALUES (1)")
                .await?;
            Err(AppError::validation("second step failed"))
        });

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(rows(&persistence).await, 0);
    }
}
