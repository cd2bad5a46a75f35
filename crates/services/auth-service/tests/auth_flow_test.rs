//! Account lifecycle against the real user store.

use std::sync::Arc;

use auth_service_lib::config::AuthServiceConfig;
use auth_service_lib::AuthService;
use billing_service::config::BillingConfig;
use billing_service::infra::Database;
use billing_service::notify::Notifier;
use billing_service::repository::UserRepository;
use billing_service::{ServiceContainer, Services};
use common::AppError;
use domain::{EntityKind, UserRole};

struct TestAuth {
    _db: Database,
    services: Services,
    auth: Arc<dyn AuthService>,
}

async fn setup() -> TestAuth {
    let db = Database::in_memory().await.unwrap();
    let services = Services::from_connection(
        db.get_connection(),
        &BillingConfig::default(),
        Notifier::logging(),
    );
    let config = AuthServiceConfig::with_secret("integration-secret-that-is-long-enough").unwrap();
    let auth = auth_service_lib::embedded(&services, config);
    TestAuth {
        _db: db,
        services,
        auth,
    }
}

#[tokio::test]
async fn test_register_login_and_current_user() {
    let t = setup().await;

    let admin = t
        .auth
        .register("root".into(), "root@example.com".into(), "password123".into())
        .await
        .unwrap();
    let clerk = t
        .auth
        .register("clerk".into(), "clerk@example.com".into(), "password123".into())
        .await
        .unwrap();
    assert_eq!(admin.role, UserRole::Admin);
    assert_eq!(clerk.role, UserRole::User);

    let token = t
        .auth
        .login("clerk@example.com".into(), "password123".into())
        .await
        .unwrap();
    let claims = t.auth.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.sub, clerk.id);

    let me = t.auth.current_user(claims.sub).await.unwrap();
    assert_eq!(me.username, "clerk");
    assert!(me.last_login.is_some());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let t = setup().await;
    t.auth
        .register("root".into(), "root@example.com".into(), "password123".into())
        .await
        .unwrap();

    let result = t
        .auth
        .register("other".into(), "ROOT@example.com".into(), "password123".into())
        .await;

    assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
}

#[tokio::test]
async fn test_soft_deleted_user_cannot_login() {
    let t = setup().await;
    let admin = t
        .auth
        .register("root".into(), "root@example.com".into(), "password123".into())
        .await
        .unwrap();
    let clerk = t
        .auth
        .register("clerk".into(), "clerk@example.com".into(), "password123".into())
        .await
        .unwrap();

    t.services
        .lifecycle()
        .soft_delete(EntityKind::User, clerk.id, admin.id)
        .await
        .unwrap();

    let result = t.auth.login("clerk".into(), "password123".into()).await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));

    let me = t.auth.current_user(clerk.id).await;
    assert!(matches!(me, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_password_reset_round() {
    let t = setup().await;
    t.auth
        .register("root".into(), "root@example.com".into(), "password123".into())
        .await
        .unwrap();

    t.auth.forgot_password("root@example.com".into()).await.unwrap();
    let token = t
        .services
        .user_repository()
        .find_by_email("root@example.com")
        .await
        .unwrap()
        .and_then(|u| u.reset_token)
        .unwrap();

    t.auth
        .reset_password(token.clone(), "brand-new-pass".into())
        .await
        .unwrap();

    let reused = t.auth.reset_password(token, "another-pass".into()).await;
    assert!(matches!(reused, Err(AppError::Validation(_))));

    let old = t.auth.login("root".into(), "password123".into()).await;
    assert!(matches!(old, Err(AppError::InvalidCredentials)));
    t.auth
        .login("root".into(), "brand-new-pass".into())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_seed_admin_promotes_registered_user() {
    let t = setup().await;
    t.auth
        .register("root".into(), "root@example.com".into(), "password123".into())
        .await
        .unwrap();
    let clerk = t
        .auth
        .register("clerk".into(), "clerk@example.com".into(), "password123".into())
        .await
        .unwrap();

    let promoted = t
        .auth
        .seed_admin("clerk".into(), "ignored@example.com".into(), "ignored-pass".into())
        .await
        .unwrap();

    assert_eq!(promoted.id, clerk.id);
    assert_eq!(promoted.role, UserRole::Admin);
    assert_eq!(promoted.email, "clerk@example.com");
}
