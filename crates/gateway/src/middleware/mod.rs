//! Middleware for authentication and authorization.

mod auth;

pub use auth::{auth_middleware, require_admin, CurrentUser};
