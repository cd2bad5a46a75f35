//! Shared fixtures: an in-memory SQLite database with every migration
//! applied and the full service container on top of it.

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use uuid::Uuid;

use billing_service::config::BillingConfig;
use billing_service::infra::Database;
use billing_service::notify::Notifier;
use billing_service::repository::{NewUser, UserRepository, UserStore};
use billing_service::{ServiceContainer, Services};
use domain::{CreateDevice, CreateOffice, Device, NewUsageRecord, Office, PlanType, User, UserRole};

pub struct TestApp {
    pub db: Database,
    pub services: Services,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::in_memory().await.expect("in-memory database");
        let services = Services::from_connection(
            db.get_connection(),
            &BillingConfig::default(),
            Notifier::logging(),
        );
        Self { db, services }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        self.db.connection()
    }

    pub async fn exec(&self, sql: &str) {
        self.conn()
            .execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await
            .expect("raw statement");
    }

    pub async fn office(&self, name: &str, npi_id: &str) -> Office {
        self.services
            .offices()
            .create_office(CreateOffice {
                name: name.to_string(),
                npi_id: npi_id.to_string(),
                state: "CA".to_string(),
                town: "Fresno".to_string(),
                address: "1 Main St".to_string(),
                phone: None,
                email: Some(format!("{}@example.com", npi_id)),
            })
            .await
            .expect("create office")
    }

    pub async fn device(&self, office_id: Uuid, serial: &str, plan_type: PlanType) -> Device {
        self.services
            .devices()
            .create_device(CreateDevice {
                serial_number: serial.to_string(),
                office_id,
                purchase_date: NaiveDate::from_ymd_opt(2024, 1, 10).expect("date"),
                connected_phone: "555-0100".to_string(),
                sbc_identifier: format!("sbc-{}", serial),
                plan_type,
            })
            .await
            .expect("create device")
    }

    pub async fn user(&self, username: &str, role: UserRole) -> User {
        UserStore::new(self.db.get_connection())
            .create(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "hashed".to_string(),
                role,
            })
            .await
            .expect("create user")
    }
}

/// 09:00 UTC on the given day.
pub fn morning(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}

pub fn session(device_id: Uuid, start: DateTime<Utc>, seconds: i64) -> NewUsageRecord {
    NewUsageRecord {
        device_id,
        button_number: 1,
        start_time: start,
        end_time: start + Duration::seconds(seconds),
    }
}
