//! Lune billing binary - the HTTP API, migrations and admin seeding.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_service_lib::config::AuthServiceConfig;
use billing_service::config::BillingConfig;
use billing_service::infra::Database;
use billing_service::notify::{LogMailer, Notifier};
use billing_service::Services;
use gateway_lib::config::GatewayConfig;
use gateway_lib::state::AppState;

#[derive(Parser)]
#[command(name = "lune-billing")]
#[command(about = "Billing backend for Lune dental devices")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "GATEWAY_HOST")]
        host: Option<String>,
        #[arg(long, env = "GATEWAY_PORT")]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Create or promote an administrator account
    SeedAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SEED_ADMIN_PASSWORD")]
        password: String,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

impl From<MigrateAction> for billing_service::MigrateAction {
    fn from(action: MigrateAction) -> Self {
        match action {
            MigrateAction::Up => Self::Up,
            MigrateAction::Down => Self::Down,
            MigrateAction::Status => Self::Status,
            MigrateAction::Fresh => Self::Fresh,
        }
    }
}

/// Connect, migrate and wire the billing services.
async fn bootstrap() -> Result<(Database, Services), Box<dyn std::error::Error>> {
    let config = BillingConfig::from_env();
    let db = Database::connect(&config.database).await?;
    let notifier = Notifier::new(
        Arc::new(LogMailer),
        config.mail_from.clone(),
        config.public_app_url.clone(),
    );
    let services = Services::from_connection(db.get_connection(), &config, notifier);
    Ok((db, services))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=debug"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let gateway = GatewayConfig::from_env();
            let host = host.unwrap_or_else(|| gateway.host.clone());
            let port = port.unwrap_or(gateway.port);

            let (db, services) = bootstrap().await?;
            let auth = auth_service_lib::embedded(&services, AuthServiceConfig::from_env()?);
            let state = AppState::new(Arc::new(services), auth, gateway).with_database(db);

            info!("Starting Lune billing API on http://{}:{}", host, port);
            gateway_lib::serve(state, &host, port).await?;
        }
        Commands::Migrate { action } => {
            billing_service::run_migrations(action.into()).await?;
        }
        Commands::SeedAdmin {
            username,
            email,
            password,
        } => {
            let (_db, services) = bootstrap().await?;
            let auth = auth_service_lib::embedded(&services, AuthServiceConfig::from_env()?);
            let admin = auth.seed_admin(username, email, password).await?;
            info!(user_id = %admin.id, username = %admin.username, "Administrator ready");
        }
    }

    Ok(())
}
