//! Service container - every billing service wired over one database.
//!
//! The database handle is created once at startup and injected here; the
//! gateway and the CLI receive the finished container.

use std::sync::Arc;

use crate::config::BillingConfig;
use crate::infra::Persistence;
use crate::lifecycle::{Lifecycle, LifecycleEngine};
use crate::notify::Notifier;
use crate::payment::{processor_from_config, PaymentProcessor};
use crate::repository::{
    DeviceStore, InvoiceStore, OfficeStore, PaymentStore, UsageStore, UserRepository, UserStore,
};

use super::{
    BillingReporter, DeviceManager, DeviceService, InvoiceManager, InvoiceService, OfficeManager,
    OfficeService, PaymentManager, PaymentService, Reporter, UsageManager, UsageService,
    UserManager, UserService,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn offices(&self) -> Arc<dyn OfficeService>;

    fn devices(&self) -> Arc<dyn DeviceService>;

    fn usage(&self) -> Arc<dyn UsageService>;

    fn invoices(&self) -> Arc<dyn InvoiceService>;

    fn payments(&self) -> Arc<dyn PaymentService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn reporter(&self) -> Arc<dyn Reporter>;

    fn lifecycle(&self) -> Arc<dyn Lifecycle>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    office_service: Arc<dyn OfficeService>,
    device_service: Arc<dyn DeviceService>,
    usage_service: Arc<dyn UsageService>,
    invoice_service: Arc<dyn InvoiceService>,
    payment_service: Arc<dyn PaymentService>,
    user_service: Arc<dyn UserService>,
    reporter: Arc<dyn Reporter>,
    lifecycle: Arc<dyn Lifecycle>,
    user_repository: Arc<dyn UserRepository>,
    notifier: Notifier,
}

impl Services {
    /// Wire every service over the connection, choosing the payment
    /// processor from the configuration.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: &BillingConfig,
        notifier: Notifier,
    ) -> Self {
        let processor = processor_from_config(config);
        Self::with_processor(db, config, notifier, processor)
    }

    /// Wire every service with an explicit payment processor.
    pub fn with_processor(
        db: sea_orm::DatabaseConnection,
        config: &BillingConfig,
        notifier: Notifier,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        let persistence = Persistence::new(db.clone());

        let offices = Arc::new(OfficeStore::new(db.clone()));
        let devices = Arc::new(DeviceStore::new(db.clone()));
        let usage = Arc::new(UsageStore::new(db.clone()));
        let invoices = Arc::new(InvoiceStore::new(db.clone()));
        let payments = Arc::new(PaymentStore::new(db.clone()));
        let users = Arc::new(UserStore::new(db));

        Self {
            office_service: Arc::new(OfficeManager::new(offices.clone())),
            device_service: Arc::new(DeviceManager::new(devices.clone(), offices.clone())),
            usage_service: Arc::new(UsageManager::new(
                persistence.clone(),
                usage.clone(),
                devices.clone(),
            )),
            invoice_service: Arc::new(InvoiceManager::new(
                invoices.clone(),
                offices.clone(),
                devices,
                usage,
                config.pricing(),
                notifier.clone(),
            )),
            payment_service: Arc::new(PaymentManager::new(
                persistence.clone(),
                payments,
                invoices.clone(),
                offices.clone(),
                processor,
                notifier.clone(),
                config.currency.clone(),
            )),
            user_service: Arc::new(UserManager::new(users.clone())),
            reporter: Arc::new(BillingReporter::new(offices, invoices)),
            lifecycle: Arc::new(LifecycleEngine::new(persistence)),
            user_repository: users,
            notifier,
        }
    }

    /// User store, shared with the auth service.
    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }
}

impl ServiceContainer for Services {
    fn offices(&self) -> Arc<dyn OfficeService> {
        self.office_service.clone()
    }

    fn devices(&self) -> Arc<dyn DeviceService> {
        self.device_service.clone()
    }

    fn usage(&self) -> Arc<dyn UsageService> {
        self.usage_service.clone()
    }

    fn invoices(&self) -> Arc<dyn InvoiceService> {
        self.invoice_service.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payment_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn reporter(&self) -> Arc<dyn Reporter> {
        self.reporter.clone()
    }

    fn lifecycle(&self) -> Arc<dyn Lifecycle> {
        self.lifecycle.clone()
    }
}
