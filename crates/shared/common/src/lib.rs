//! Common utilities shared across the billing services.
//!
//! This crate provides:
//! - Unified HTTP error handling
//! - Configuration structures and environment helpers

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
