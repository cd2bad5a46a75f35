//! Office service - registration and maintenance of dental offices.
//!
//! Deleting and restoring offices is the lifecycle engine's job; this
//! service only creates, reads and edits them.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{CreateOffice, ListScope, Office, UpdateOffice};

use super::validation;
use crate::repository::OfficeRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Office service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OfficeService: Send + Sync {
    /// Register a new office
    async fn create_office(&self, data: CreateOffice) -> AppResult<Office>;

    /// Get an office by ID, including soft-deleted ones
    async fn get_office(&self, id: Uuid) -> AppResult<Office>;

    async fn list_offices(&self, scope: ListScope) -> AppResult<Vec<Office>>;

    /// Edit an active office
    async fn update_office(&self, id: Uuid, data: UpdateOffice) -> AppResult<Office>;
}

/// Concrete implementation of OfficeService using repository.
pub struct OfficeManager {
    repo: Arc<dyn OfficeRepository>,
}

impl OfficeManager {
    pub fn new(repo: Arc<dyn OfficeRepository>) -> Self {
        Self { repo }
    }

    async fn ensure_npi_free(&self, npi_id: &str, except: Option<Uuid>) -> AppResult<()> {
        match self.repo.find_by_npi_with_deleted(npi_id).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::constraint(format!(
                "An office with NPI {} already exists",
                npi_id
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl OfficeService for OfficeManager {
    async fn create_office(&self, data: CreateOffice) -> AppResult<Office> {
        let data = CreateOffice {
            name: validation::required("Name", data.name)?,
            npi_id: validation::npi(data.npi_id)?,
            state: validation::required("State", data.state)?,
            town: validation::required("Town", data.town)?,
            address: validation::required("Address", data.address)?,
            phone: validation::optional(data.phone),
            email: validation::optional(data.email),
        };

        self.ensure_npi_free(&data.npi_id, None).await?;

        let office = self.repo.create(data).await?;
        tracing::info!(office_id = %office.id, npi_id = %office.npi_id, "Office created");
        Ok(office)
    }

    async fn get_office(&self, id: Uuid) -> AppResult<Office> {
        self.repo
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("Office")
    }

    async fn list_offices(&self, scope: ListScope) -> AppResult<Vec<Office>> {
        self.repo.list(scope).await
    }

    async fn update_office(&self, id: Uuid, data: UpdateOffice) -> AppResult<Office> {
        let data = UpdateOffice {
            name: data.name.map(|v| validation::required("Name", v)).transpose()?,
            npi_id: data.npi_id.map(validation::npi).transpose()?,
            state: data.state.map(|v| validation::required("State", v)).transpose()?,
            town: data.town.map(|v| validation::required("Town", v)).transpose()?,
            address: data.address.map(|v| validation::required("Address", v)).transpose()?,
            phone: data.phone.map(|v| v.trim().to_string()),
            email: data.email.map(|v| v.trim().to_string()),
        };

        if let Some(npi_id) = &data.npi_id {
            self.ensure_npi_free(npi_id, Some(id)).await?;
        }

        self.repo.update(id, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockOfficeRepository;
    use chrono::Utc;

    fn office(id: Uuid, npi_id: &str) -> Office {
        Office {
            id,
            name: "Bright Smiles".to_string(),
            npi_id: npi_id.to_string(),
            state: "CA".to_string(),
            town: "Fresno".to_string(),
            address: "1 Main St".to_string(),
            phone: None,
            email: None,
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_request(npi_id: &str) -> CreateOffice {
        CreateOffice {
            name: " Bright Smiles ".to_string(),
            npi_id: npi_id.to_string(),
            state: "CA".to_string(),
            town: "Fresno".to_string(),
            address: "1 Main St".to_string(),
            phone: Some("".to_string()),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_create_office_trims_and_persists() {
        let mut repo = MockOfficeRepository::new();
        repo.expect_find_by_npi_with_deleted().returning(|_| Ok(None));
        repo.expect_create()
            .withf(|data| data.name == "Bright Smiles" && data.phone.is_none())
            .returning(|data| Ok(office(Uuid::new_v4(), &data.npi_id)));

        let service = OfficeManager::new(Arc::new(repo));
        let created = service.create_office(create_request("1234567890")).await.unwrap();

        assert_eq!(created.npi_id, "1234567890");
    }

    #[tokio::test]
    async fn test_create_office_rejects_bad_npi() {
        let repo = MockOfficeRepository::new();
        let service = OfficeManager::new(Arc::new(repo));

        let result = service.create_office(create_request("12345")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_office_duplicate_npi_is_constraint_violation() {
        let mut repo = MockOfficeRepository::new();
        repo.expect_find_by_npi_with_deleted()
            .returning(|npi| Ok(Some(office(Uuid::new_v4(), npi))));

        let service = OfficeManager::new(Arc::new(repo));
        let result = service.create_office(create_request("1234567890")).await;

        assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_update_office_keeping_own_npi_is_allowed() {
        let id = Uuid::new_v4();
        let mut repo = MockOfficeRepository::new();
        repo.expect_find_by_npi_with_deleted()
            .returning(move |npi| Ok(Some(office(id, npi))));
        repo.expect_update()
            .returning(move |_, data| Ok(office(id, data.npi_id.as_deref().unwrap_or_default())));

        let service = OfficeManager::new(Arc::new(repo));
        let update = UpdateOffice {
            npi_id: Some("1234567890".to_string()),
            ..Default::default()
        };

        assert!(service.update_office(id, update).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_office_not_found() {
        let mut repo = MockOfficeRepository::new();
        repo.expect_find_by_id_with_deleted().returning(|_| Ok(None));

        let service = OfficeManager::new(Arc::new(repo));
        let result = service.get_office(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Office not found"));
    }
}
