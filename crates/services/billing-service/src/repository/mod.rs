//! Repository layer for data access.
//!
//! Every repository is a trait with a SeaORM-backed `*Store` implementation.
//! Queries that must also run inside a transaction are exposed as free
//! functions generic over the connection so that stores and unit-of-work
//! closures share one implementation.

pub mod entities;
mod device_repository;
mod invoice_repository;
mod office_repository;
mod payment_repository;
mod usage_repository;
mod user_repository;

pub use device_repository::{DeviceRepository, DeviceStore};
pub use invoice_repository::{InvoiceRepository, InvoiceStore, NewInvoice};
pub use office_repository::{OfficeRepository, OfficeStore};
pub use payment_repository::{NewPaymentIntent, PaymentRepository, PaymentStore};
pub use usage_repository::{UsageRepository, UsageStore};
pub use user_repository::{NewUser, UserRepository, UserStore};

pub(crate) use invoice_repository::set_invoice_status;
pub(crate) use payment_repository::set_payment_status;
pub(crate) use usage_repository::insert_usage_batch;

#[cfg(any(test, feature = "test-utils"))]
pub use device_repository::MockDeviceRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use invoice_repository::MockInvoiceRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use office_repository::MockOfficeRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_repository::MockPaymentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use usage_repository::MockUsageRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

use domain::ListScope;

/// Filter value for a deletion flag column, `None` meaning no filter.
pub(crate) fn deleted_flag_filter(scope: ListScope) -> Option<bool> {
    match scope {
        ListScope::Active => Some(false),
        ListScope::Deleted => Some(true),
        ListScope::All => None,
    }
}
