//! Soft-delete lifecycle shared by offices, devices, invoices and users.

pub mod descriptor;
mod engine;

pub use descriptor::{descriptor, EntityDescriptor};
pub use engine::{Lifecycle, LifecycleEngine};

#[cfg(any(test, feature = "test-utils"))]
pub use engine::MockLifecycle;
