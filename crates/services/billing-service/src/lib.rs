//! Billing Service Library
//!
//! Offices, devices, usage, invoices, payments and users of the Lune
//! billing platform, with the soft-delete lifecycle engine and the
//! financial reporter. The gateway and the combined binary embed it
//! in-process.

pub mod config;
pub mod infra;
pub mod lifecycle;
pub mod notify;
pub mod payment;
pub mod repository;
pub mod service;

use tracing::info;

use crate::config::BillingConfig;
use crate::infra::Database;

pub use crate::service::{ServiceContainer, Services};

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = BillingConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
