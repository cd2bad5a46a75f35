//! Lifecycle vocabulary shared by every soft-deletable entity.
//!
//! Offices, devices, invoices and users all move through the same three
//! states. The persistence layer owns the transitions; this module only
//! names the states, the entity kinds and the ways a transition can fail.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Entity kinds managed by the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Office,
    Device,
    Invoice,
    User,
}

impl EntityKind {
    /// Human readable name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Office => "Office",
            EntityKind::Device => "Device",
            EntityKind::Invoice => "Invoice",
            EntityKind::User => "User",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// State of a single entity instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    SoftDeleted,
    /// Permanently removed; terminal
    Gone,
}

impl LifecycleState {
    pub fn from_deleted_flag(is_deleted: bool) -> Self {
        if is_deleted {
            LifecycleState::SoftDeleted
        } else {
            LifecycleState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }
}

/// Which rows a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ListScope {
    #[default]
    Active,
    Deleted,
    All,
}

/// Summary of a permanently removed entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PurgedEntity {
    pub id: Uuid,
    pub display_name: String,
}

/// Error classes callers map onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleErrorKind {
    NotFound,
    InvalidStateTransition,
    SelfModificationForbidden,
    ValidationError,
    ConstraintViolation,
    DependencyFailure,
}

/// Failure of a lifecycle transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{entity} not found")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("{entity} not found or already deleted")]
    AlreadyDeleted { entity: EntityKind, id: Uuid },

    #[error("{entity} not found or not deleted")]
    NotDeleted { entity: EntityKind, id: Uuid },

    #[error("You cannot delete your own account")]
    SelfModificationForbidden,

    #[error("Admin users cannot be permanently deleted")]
    AdminProtected { id: Uuid },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    ConstraintViolation(String),

    /// Store failure; the message is for logs, not for clients
    #[error("Dependency failure: {0}")]
    DependencyFailure(String),
}

impl LifecycleError {
    pub fn kind(&self) -> LifecycleErrorKind {
        match self {
            LifecycleError::NotFound { .. } | LifecycleError::NotDeleted { .. } => {
                LifecycleErrorKind::NotFound
            }
            LifecycleError::AlreadyDeleted { .. } | LifecycleError::AdminProtected { .. } => {
                LifecycleErrorKind::InvalidStateTransition
            }
            LifecycleError::SelfModificationForbidden => {
                LifecycleErrorKind::SelfModificationForbidden
            }
            LifecycleError::Validation(_) => LifecycleErrorKind::ValidationError,
            LifecycleError::ConstraintViolation(_) => LifecycleErrorKind::ConstraintViolation,
            LifecycleError::DependencyFailure(_) => LifecycleErrorKind::DependencyFailure,
        }
    }

    pub fn dependency(msg: impl Into<String>) -> Self {
        LifecycleError::DependencyFailure(msg.into())
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_entity() {
        let id = Uuid::new_v4();
        assert_eq!(
            LifecycleError::AlreadyDeleted { entity: EntityKind::Office, id }.to_string(),
            "Office not found or already deleted"
        );
        assert_eq!(
            LifecycleError::NotDeleted { entity: EntityKind::Device, id }.to_string(),
            "Device not found or not deleted"
        );
    }

    #[test]
    fn test_error_classification() {
        let id = Uuid::new_v4();
        assert_eq!(
            LifecycleError::NotFound { entity: EntityKind::Invoice, id }.kind(),
            LifecycleErrorKind::NotFound
        );
        assert_eq!(
            LifecycleError::NotDeleted { entity: EntityKind::Office, id }.kind(),
            LifecycleErrorKind::NotFound
        );
        assert_eq!(
            LifecycleError::AdminProtected { id }.kind(),
            LifecycleErrorKind::InvalidStateTransition
        );
        assert_eq!(
            LifecycleError::SelfModificationForbidden.kind(),
            LifecycleErrorKind::SelfModificationForbidden
        );
        assert_eq!(
            LifecycleError::dependency("boom").kind(),
            LifecycleErrorKind::DependencyFailure
        );
    }

    #[test]
    fn test_list_scope_defaults_to_active() {
        assert_eq!(ListScope::default(), ListScope::Active);
        let parsed: ListScope = serde_json::from_str("\"deleted\"").unwrap();
        assert_eq!(parsed, ListScope::Deleted);
    }
}
