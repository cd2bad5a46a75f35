//! Application state for dependency injection.

use std::sync::Arc;

use auth_service_lib::AuthService;
use billing_service::infra::Database;
use billing_service::ServiceContainer;

use crate::config::GatewayConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceContainer>,
    pub auth: Arc<dyn AuthService>,
    /// Checked by the health endpoint when present
    pub database: Option<Database>,
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        auth: Arc<dyn AuthService>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            services,
            auth,
            database: None,
            config,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }
}
