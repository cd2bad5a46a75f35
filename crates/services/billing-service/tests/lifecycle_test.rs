//! Lifecycle engine against a real schema.

mod support;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use billing_service::repository::entities::{device, invoice, office, usage_record};
use billing_service::ServiceContainer;
use common::AppError;
use support::{morning, session, TestApp};
use domain::{EntityKind, LifecycleError, LifecycleState, ListScope, PlanType, UserRole};

async fn device_count(app: &TestApp, office_id: Uuid) -> u64 {
    device::Entity::find()
        .filter(device::Column::OfficeId.eq(office_id))
        .count(app.conn())
        .await
        .unwrap()
}

async fn invoice_count(app: &TestApp, office_id: Uuid) -> u64 {
    invoice::Entity::find()
        .filter(invoice::Column::OfficeId.eq(office_id))
        .count(app.conn())
        .await
        .unwrap()
}

async fn usage_count(app: &TestApp, device_ids: &[Uuid]) -> u64 {
    usage_record::Entity::find()
        .filter(usage_record::Column::DeviceId.is_in(device_ids.iter().copied()))
        .count(app.conn())
        .await
        .unwrap()
}

/// Office with two devices, usage on both, and one invoice.
async fn populated_office(app: &TestApp) -> (Uuid, Vec<Uuid>) {
    let office = app.office("Bright Smiles", "1234567890").await;
    let a = app.device(office.id, "LUNE-A", PlanType::Monthly).await;
    let b = app.device(office.id, "LUNE-B", PlanType::PerSession).await;

    let usage = app.services.usage();
    usage.record(session(a.id, morning(2024, 3, 4), 300)).await.unwrap();
    usage.record(session(b.id, morning(2024, 3, 5), 120)).await.unwrap();
    usage.record(session(b.id, morning(2024, 3, 6), 90)).await.unwrap();

    app.services.invoices().generate(office.id, 3, 2024).await.unwrap();

    (office.id, vec![a.id, b.id])
}

#[tokio::test]
async fn test_permanent_delete_twice_reports_not_found() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let office = app.office("Bright Smiles", "1234567890").await;
    let lifecycle = app.services.lifecycle();

    let purged = lifecycle
        .permanent_delete(EntityKind::Office, office.id, admin.id)
        .await
        .unwrap();
    assert_eq!(purged.id, office.id);
    assert_eq!(purged.display_name, "Bright Smiles");

    let gone = office::Entity::find_by_id(office.id).one(app.conn()).await.unwrap();
    assert!(gone.is_none());

    let second = lifecycle
        .permanent_delete(EntityKind::Office, office.id, admin.id)
        .await;
    assert!(matches!(second, Err(LifecycleError::NotFound { .. })));
    assert_eq!(
        lifecycle.state_of(EntityKind::Office, office.id).await.unwrap(),
        LifecycleState::Gone
    );
}

#[tokio::test]
async fn test_office_purge_removes_every_dependent_row() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let (office_id, device_ids) = populated_office(&app).await;

    let invoice = app
        .services
        .invoices()
        .list_invoices(Some(office_id), ListScope::Active)
        .await
        .unwrap()
        .remove(0);
    app.services
        .payments()
        .create_for_invoice(invoice.id, Some(admin.id))
        .await
        .unwrap();

    app.services
        .lifecycle()
        .permanent_delete(EntityKind::Office, office_id, admin.id)
        .await
        .unwrap();

    assert_eq!(device_count(&app, office_id).await, 0);
    assert_eq!(invoice_count(&app, office_id).await, 0);
    assert_eq!(usage_count(&app, &device_ids).await, 0);
}

#[tokio::test]
async fn test_soft_delete_then_restore_brings_devices_back() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let (office_id, device_ids) = populated_office(&app).await;
    let lifecycle = app.services.lifecycle();

    lifecycle
        .soft_delete(EntityKind::Office, office_id, admin.id)
        .await
        .unwrap();

    assert_eq!(
        lifecycle.state_of(EntityKind::Office, office_id).await.unwrap(),
        LifecycleState::SoftDeleted
    );
    for id in &device_ids {
        assert_eq!(
            lifecycle.state_of(EntityKind::Device, *id).await.unwrap(),
            LifecycleState::SoftDeleted
        );
    }
    let deleted = office::Entity::find_by_id(office_id)
        .one(app.conn())
        .await
        .unwrap()
        .unwrap();
    assert!(deleted.deleted_at.is_some());

    let again = lifecycle
        .soft_delete(EntityKind::Office, office_id, admin.id)
        .await;
    assert!(matches!(again, Err(LifecycleError::AlreadyDeleted { .. })));

    lifecycle.restore(EntityKind::Office, office_id).await.unwrap();

    let office = app.services.offices().get_office(office_id).await.unwrap();
    assert!(!office.is_deleted);
    assert!(office.deleted_at.is_none());
    let active = app
        .services
        .devices()
        .list_devices(Some(office_id), ListScope::Active)
        .await
        .unwrap();
    assert_eq!(active.len(), device_ids.len());
}

#[tokio::test]
async fn test_office_restore_also_restores_devices_deleted_earlier() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let office = app.office("Bright Smiles", "1234567890").await;
    let device = app.device(office.id, "LUNE-A", PlanType::Monthly).await;
    let lifecycle = app.services.lifecycle();

    lifecycle.soft_delete(EntityKind::Device, device.id, admin.id).await.unwrap();
    lifecycle.soft_delete(EntityKind::Office, office.id, admin.id).await.unwrap();
    lifecycle.restore(EntityKind::Office, office.id).await.unwrap();

    assert_eq!(
        lifecycle.state_of(EntityKind::Device, device.id).await.unwrap(),
        LifecycleState::Active
    );
}

#[tokio::test]
async fn test_restore_of_active_row_reports_not_deleted() {
    let app = TestApp::new().await;
    let office = app.office("Bright Smiles", "1234567890").await;

    let result = app.services.lifecycle().restore(EntityKind::Office, office.id).await;

    match result {
        Err(err @ LifecycleError::NotDeleted { .. }) => {
            assert_eq!(err.to_string(), "Office not found or not deleted");
            let app_err = AppError::from(err);
            assert_eq!(app_err.status().as_u16(), 404);
            assert_eq!(app_err.code(), "NOT_FOUND");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_device_step_rolls_back_the_whole_purge() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let (office_id, device_ids) = populated_office(&app).await;
    let usage_before = usage_count(&app, &device_ids).await;

    app.exec(
        "CREATE TRIGGER fail_device_purge BEFORE DELETE ON devices \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END",
    )
    .await;

    let result = app
        .services
        .lifecycle()
        .permanent_delete(EntityKind::Office, office_id, admin.id)
        .await;

    assert!(matches!(result, Err(LifecycleError::DependencyFailure(_))));
    assert!(office::Entity::find_by_id(office_id).one(app.conn()).await.unwrap().is_some());
    assert_eq!(device_count(&app, office_id).await, 2);
    assert_eq!(invoice_count(&app, office_id).await, 1);
    assert_eq!(usage_count(&app, &device_ids).await, usage_before);
}

#[tokio::test]
async fn test_admin_cannot_delete_own_account() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let lifecycle = app.services.lifecycle();

    let soft = lifecycle.soft_delete(EntityKind::User, admin.id, admin.id).await;
    assert!(matches!(soft, Err(LifecycleError::SelfModificationForbidden)));

    let hard = lifecycle
        .permanent_delete(EntityKind::User, admin.id, admin.id)
        .await;
    assert!(matches!(hard, Err(LifecycleError::SelfModificationForbidden)));

    assert_eq!(
        lifecycle.state_of(EntityKind::User, admin.id).await.unwrap(),
        LifecycleState::Active
    );
}

#[tokio::test]
async fn test_admin_accounts_cannot_be_purged() {
    let app = TestApp::new().await;
    let root = app.user("root", UserRole::Admin).await;
    let other = app.user("second", UserRole::Admin).await;

    let result = app
        .services
        .lifecycle()
        .permanent_delete(EntityKind::User, other.id, root.id)
        .await;

    assert!(matches!(result, Err(LifecycleError::AdminProtected { .. })));
}

#[tokio::test]
async fn test_user_soft_delete_clears_is_active_and_purge_keeps_payments() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let clerk = app.user("clerk", UserRole::User).await;
    let (office_id, _) = populated_office(&app).await;
    let invoice = app
        .services
        .invoices()
        .list_invoices(Some(office_id), ListScope::Active)
        .await
        .unwrap()
        .remove(0);
    let checkout = app
        .services
        .payments()
        .create_for_invoice(invoice.id, Some(clerk.id))
        .await
        .unwrap();
    let lifecycle = app.services.lifecycle();

    lifecycle.soft_delete(EntityKind::User, clerk.id, admin.id).await.unwrap();
    let stored = app.services.users().get_user(clerk.id).await.unwrap();
    assert!(!stored.is_active);

    lifecycle
        .permanent_delete(EntityKind::User, clerk.id, admin.id)
        .await
        .unwrap();

    let intent = billing_service::repository::entities::payment_intent::Entity::find_by_id(
        checkout.intent.id,
    )
    .one(app.conn())
    .await
    .unwrap()
    .unwrap();
    assert_eq!(intent.user_id, None);
}

#[tokio::test]
async fn test_invoice_purge_removes_its_payment_intents() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let (office_id, _) = populated_office(&app).await;
    let invoice = app
        .services
        .invoices()
        .list_invoices(Some(office_id), ListScope::Active)
        .await
        .unwrap()
        .remove(0);
    app.services
        .payments()
        .create_for_invoice(invoice.id, None)
        .await
        .unwrap();

    let purged = app
        .services
        .lifecycle()
        .permanent_delete(EntityKind::Invoice, invoice.id, admin.id)
        .await
        .unwrap();

    assert_eq!(purged.display_name, invoice.invoice_number);
    assert_eq!(invoice_count(&app, office_id).await, 0);
}
