//! Service layer - business use cases over the repositories.

mod container;
mod device_service;
mod invoice_service;
mod office_service;
mod payment_service;
mod reporter;
mod usage_service;
mod user_service;
mod validation;

pub use container::{ServiceContainer, Services};
pub use device_service::{DeviceManager, DeviceService};
pub use invoice_service::{InvoiceManager, InvoiceService};
pub use office_service::{OfficeManager, OfficeService};
pub use payment_service::{PaymentCheckout, PaymentManager, PaymentService};
pub use reporter::{BillingReporter, Dashboard, OfficeSummary, Reporter};
pub use usage_service::{UsageManager, UsageService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use device_service::MockDeviceService;
#[cfg(any(test, feature = "test-utils"))]
pub use invoice_service::MockInvoiceService;
#[cfg(any(test, feature = "test-utils"))]
pub use office_service::MockOfficeService;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_service::MockPaymentService;
#[cfg(any(test, feature = "test-utils"))]
pub use reporter::MockReporter;
#[cfg(any(test, feature = "test-utils"))]
pub use usage_service::MockUsageService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
