//! Usage ingestion, invoicing, payments and reporting end to end.

mod support;

use sea_orm::{EntityTrait, PaginatorTrait};

use billing_service::repository::entities::usage_record;
use billing_service::ServiceContainer;
use support::{morning, session, TestApp};
use common::AppError;
use domain::{
    EntityKind, InvoiceStatus, ListScope, Money, OfficePaymentStatus, PlanType, UserRole,
    PROCESSOR_STATUS_SUCCEEDED,
};

async fn stored_usage(app: &TestApp) -> u64 {
    usage_record::Entity::find().count(app.conn()).await.unwrap()
}

#[tokio::test]
async fn test_non_positive_duration_writes_nothing() {
    let app = TestApp::new().await;
    let office = app.office("Bright Smiles", "1234567890").await;
    let device = app.device(office.id, "LUNE-A", PlanType::PerSession).await;
    let start = morning(2024, 3, 4);

    let zero = app.services.usage().record(session(device.id, start, 0)).await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    let negative = app.services.usage().record(session(device.id, start, -30)).await;
    assert!(matches!(negative, Err(AppError::Validation(_))));

    assert_eq!(stored_usage(&app).await, 0);
}

#[tokio::test]
async fn test_bulk_batch_with_one_bad_record_writes_none() {
    let app = TestApp::new().await;
    let office = app.office("Bright Smiles", "1234567890").await;
    let device = app.device(office.id, "LUNE-A", PlanType::PerSession).await;

    let batch = (0..5)
        .map(|i| {
            let seconds = if i == 2 { 0 } else { 60 };
            session(device.id, morning(2024, 3, 4 + i), seconds)
        })
        .collect();

    let result = app.services.usage().record_bulk(batch).await;

    assert!(matches!(result, Err(AppError::Validation(msg)) if msg.starts_with("Record 3:")));
    assert_eq!(stored_usage(&app).await, 0);
}

#[tokio::test]
async fn test_bulk_batch_is_stored_with_rounded_durations() {
    let app = TestApp::new().await;
    let office = app.office("Bright Smiles", "1234567890").await;
    let device = app.device(office.id, "LUNE-A", PlanType::PerSession).await;
    let start = morning(2024, 3, 4);

    let mut half_second = session(device.id, start, 10);
    half_second.end_time = start + chrono::Duration::milliseconds(10_500);
    let stored = app
        .services
        .usage()
        .record_bulk(vec![session(device.id, start, 60), half_second])
        .await
        .unwrap();

    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].duration_seconds, 11);
    assert_eq!(stored_usage(&app).await, 2);
}

#[tokio::test]
async fn test_usage_for_deleted_device_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let office = app.office("Bright Smiles", "1234567890").await;
    let device = app.device(office.id, "LUNE-A", PlanType::PerSession).await;
    app.services
        .lifecycle()
        .soft_delete(EntityKind::Device, device.id, admin.id)
        .await
        .unwrap();

    let result = app
        .services
        .usage()
        .record(session(device.id, morning(2024, 3, 4), 60))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_invoice_counts_only_sessions_in_the_month() {
    let app = TestApp::new().await;
    let office = app.office("Bright Smiles", "1234567890").await;
    let monthly = app.device(office.id, "LUNE-A", PlanType::Monthly).await;
    let metered = app.device(office.id, "LUNE-B", PlanType::PerSession).await;
    let usage = app.services.usage();
    usage.record(session(metered.id, morning(2024, 2, 29), 60)).await.unwrap();
    usage.record(session(metered.id, morning(2024, 3, 1), 60)).await.unwrap();
    usage.record(session(metered.id, morning(2024, 3, 31), 60)).await.unwrap();
    usage.record(session(monthly.id, morning(2024, 3, 15), 60)).await.unwrap();

    let invoice = app.services.invoices().generate(office.id, 3, 2024).await.unwrap();

    assert_eq!(invoice.total_amount, Money::from_cents(29_900 + 2 * 1_500));
    assert_eq!(invoice.invoice_number, "LUNE-202403-1234567890");
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);

    let duplicate = app.services.invoices().generate(office.id, 3, 2024).await;
    assert!(matches!(duplicate, Err(AppError::ConstraintViolation(_))));
}

#[tokio::test]
async fn test_duplicate_npi_is_constraint_violation() {
    let app = TestApp::new().await;
    app.office("Bright Smiles", "1234567890").await;

    let result = app
        .services
        .offices()
        .create_office(domain::CreateOffice {
            name: "Copycat Dental".to_string(),
            npi_id: "1234567890".to_string(),
            state: "CA".to_string(),
            town: "Fresno".to_string(),
            address: "2 Main St".to_string(),
            phone: None,
            email: None,
        })
        .await;

    assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
}

#[tokio::test]
async fn test_mark_paid_and_unpaid_round_trip() {
    let app = TestApp::new().await;
    let office = app.office("Bright Smiles", "1234567890").await;
    app.device(office.id, "LUNE-A", PlanType::Monthly).await;
    let invoice = app.services.invoices().generate(office.id, 3, 2024).await.unwrap();
    let invoices = app.services.invoices();

    let paid = invoices.mark_paid(invoice.id).await.unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert!(paid.paid_at.is_some());

    let again = invoices.mark_paid(invoice.id).await;
    assert!(matches!(again, Err(AppError::InvalidStateTransition(_))));

    let unpaid = invoices.mark_unpaid(invoice.id).await.unwrap();
    assert_eq!(unpaid.status, InvoiceStatus::Unpaid);
    assert!(unpaid.paid_at.is_none());
}

#[tokio::test]
async fn test_refresh_of_succeeded_intent_pays_the_invoice() {
    let app = TestApp::new().await;
    let office = app.office("Bright Smiles", "1234567890").await;
    app.device(office.id, "LUNE-A", PlanType::Monthly).await;
    let invoice = app.services.invoices().generate(office.id, 3, 2024).await.unwrap();
    let payments = app.services.payments();

    let checkout = payments.create_for_invoice(invoice.id, None).await.unwrap();
    assert_eq!(checkout.intent.amount, invoice.total_amount);
    assert!(checkout.intent.user_id.is_none());
    assert!(checkout.client_secret.is_some());

    let refreshed = payments
        .refresh(&checkout.intent.external_intent_id)
        .await
        .unwrap();
    assert_eq!(refreshed.status, PROCESSOR_STATUS_SUCCEEDED);

    let stored = app.services.invoices().get_invoice(invoice.id).await.unwrap();
    assert_eq!(stored.status, InvoiceStatus::Paid);

    let second = payments.create_for_invoice(invoice.id, None).await;
    assert!(matches!(second, Err(AppError::InvalidStateTransition(_))));
}

#[tokio::test]
async fn test_payment_for_deleted_invoice_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let office = app.office("Bright Smiles", "1234567890").await;
    app.device(office.id, "LUNE-A", PlanType::Monthly).await;
    let invoice = app.services.invoices().generate(office.id, 3, 2024).await.unwrap();
    app.services
        .lifecycle()
        .soft_delete(EntityKind::Invoice, invoice.id, admin.id)
        .await
        .unwrap();

    let result = app.services.payments().create_for_invoice(invoice.id, None).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_dashboard_reflects_invoice_state() {
    let app = TestApp::new().await;
    let admin = app.user("root", UserRole::Admin).await;
    let paid_office = app.office("Alpha Dental", "1111111111").await;
    let pending_office = app.office("Beta Dental", "2222222222").await;
    let empty_office = app.office("Gamma Dental", "3333333333").await;
    let deleted_office = app.office("Delta Dental", "4444444444").await;
    for (office, serial) in [
        (&paid_office, "A"),
        (&pending_office, "B"),
        (&deleted_office, "D"),
    ] {
        app.device(office.id, serial, PlanType::Monthly).await;
    }

    let invoices = app.services.invoices();
    let paid = invoices.generate(paid_office.id, 3, 2024).await.unwrap();
    invoices.mark_paid(paid.id).await.unwrap();
    invoices.generate(pending_office.id, 3, 2024).await.unwrap();
    invoices.generate(deleted_office.id, 3, 2024).await.unwrap();
    app.services
        .lifecycle()
        .soft_delete(EntityKind::Office, deleted_office.id, admin.id)
        .await
        .unwrap();

    let dashboard = app.services.reporter().dashboard().await.unwrap();

    let rows: Vec<_> = dashboard
        .offices
        .iter()
        .map(|o| (o.name.as_str(), o.financials.status))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Beta Dental", OfficePaymentStatus::Pending),
            ("Gamma Dental", OfficePaymentStatus::NoInvoices),
            ("Alpha Dental", OfficePaymentStatus::Paid),
        ]
    );
    assert_eq!(dashboard.totals.total_owed, Money::from_cents(29_900));
    assert_eq!(dashboard.totals.total_paid, Money::from_cents(29_900));

    let listed = app
        .services
        .offices()
        .list_offices(ListScope::Deleted)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}
