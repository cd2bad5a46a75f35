//! Auth Service Library
//!
//! Registration, login, JWT issuing and password resets for the Lune
//! billing platform. Accounts live in the billing user store; the service
//! runs in-process behind the gateway.

pub mod client;
pub mod config;
pub mod service;

use std::sync::Arc;

use billing_service::Services;

use crate::client::RepositoryDirectory;
use crate::config::AuthServiceConfig;
use crate::service::Authenticator;

pub use crate::service::{AuthService, Claims, TokenResponse};

/// Build the authenticator over the billing service's user store.
pub fn embedded(services: &Services, config: AuthServiceConfig) -> Arc<dyn AuthService> {
    let directory = Arc::new(RepositoryDirectory::new(services.user_repository()));
    Arc::new(Authenticator::new(directory, config, services.notifier()))
}
