//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the Lune billing entities, integer money, the lifecycle vocabulary shared
//! by every soft-deletable entity, and the derived office payment status.

pub mod billing;
pub mod constants;
pub mod device;
pub mod error;
pub mod invoice;
pub mod lifecycle;
pub mod money;
pub mod office;
pub mod password;
pub mod payment;
pub mod usage;
pub mod user;

pub use billing::{
    summarize_invoices, GlobalTotals, InvoiceFigures, OfficeFinancials, OfficePaymentStatus,
    PlanPricing,
};
pub use constants::*;
pub use device::{CreateDevice, Device, PlanType, UpdateDevice};
pub use error::{DomainError, DomainResult};
pub use invoice::{BillingPeriod, Invoice, InvoiceStatus};
pub use lifecycle::{
    EntityKind, LifecycleError, LifecycleErrorKind, LifecycleResult, LifecycleState, ListScope,
    PurgedEntity,
};
pub use money::Money;
pub use office::{CreateOffice, Office, UpdateOffice};
pub use password::Password;
pub use payment::PaymentIntent;
pub use usage::{session_duration_seconds, NewUsageRecord, UsageRecord, ValidatedUsage};
pub use user::{UpdateUser, User, UserResponse, UserRole};
