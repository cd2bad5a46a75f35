//! Router tests against mocked services.
//!
//! Requests go through the full axum router, including the bearer
//! middleware and error mapping, without a database.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use auth_service_lib::service::MockAuthService;
use auth_service_lib::{Claims, TokenResponse};
use billing_service::lifecycle::{Lifecycle, MockLifecycle};
use billing_service::service::{
    MockPaymentService, MockServiceContainer, PaymentCheckout, PaymentService,
};
use common::AppError;
use domain::{EntityKind, LifecycleError, Money, PaymentIntent, User, UserRole};
use gateway_lib::config::GatewayConfig;
use gateway_lib::routes::create_router;
use gateway_lib::state::AppState;

const ADMIN_ID: Uuid = Uuid::from_u128(1);
const USER_ID: Uuid = Uuid::from_u128(2);

fn claims(sub: Uuid, role: &str) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub,
        username: role.to_string(),
        role: role.to_string(),
        exp: now + 3600,
        iat: now,
    }
}

fn stored_user(id: Uuid, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id,
        username: format!("{:?}", role).to_lowercase(),
        email: format!("{}@lune.test", id.simple()),
        password_hash: String::new(),
        role,
        is_active: true,
        last_login: None,
        reset_token: None,
        reset_token_expiry: None,
        created_at: now,
        updated_at: now,
    }
}

fn verifying_tokens() -> MockAuthService {
    let mut auth = MockAuthService::new();
    auth.expect_verify_token().returning(|token| match token {
        "admin-token" => Ok(claims(ADMIN_ID, "admin")),
        "user-token" => Ok(claims(USER_ID, "user")),
        _ => Err(AppError::Unauthorized),
    });
    auth
}

/// Auth mock that knows one admin token and one user token, both backed
/// by active accounts with the same role.
fn auth() -> MockAuthService {
    let mut auth = verifying_tokens();
    auth.expect_current_user().returning(|id| match id {
        ADMIN_ID => Ok(stored_user(id, UserRole::Admin)),
        USER_ID => Ok(stored_user(id, UserRole::User)),
        _ => Err(AppError::Unauthorized),
    });
    auth
}

fn app(services: MockServiceContainer, auth: MockAuthService) -> Router {
    create_router(AppState::new(
        Arc::new(services),
        Arc::new(auth),
        GatewayConfig::default(),
    ))
}

fn with_lifecycle(lifecycle: MockLifecycle) -> MockServiceContainer {
    let lifecycle: Arc<dyn Lifecycle> = Arc::new(lifecycle);
    let mut services = MockServiceContainer::new();
    services
        .expect_lifecycle()
        .returning(move || lifecycle.clone());
    services
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_without_database_is_healthy() {
    let app = app(MockServiceContainer::new(), MockAuthService::new());

    let (status, body) = send(app, request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_protected_route_requires_bearer_token() {
    let app = app(MockServiceContainer::new(), auth());

    let (status, body) = send(app, request("GET", "/offices", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = app(MockServiceContainer::new(), auth());

    let (status, _) = send(app, request("GET", "/dashboard", Some("forged"), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_deactivated_account_is_rejected() {
    let mut auth = verifying_tokens();
    auth.expect_current_user()
        .returning(|_| Err(AppError::Unauthorized));
    let app = app(MockServiceContainer::new(), auth);

    let (status, body) = send(app, request("GET", "/dashboard", Some("user-token"), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_demoted_admin_loses_admin_routes() {
    let mut auth = verifying_tokens();
    auth.expect_current_user()
        .withf(|id| *id == ADMIN_ID)
        .returning(|id| Ok(stored_user(id, UserRole::User)));
    let mut services = MockServiceContainer::new();
    services.expect_lifecycle().never();
    let app = app(services, auth);
    let uri = format!("/offices/{}", Uuid::new_v4());

    let (status, body) = send(app, request("DELETE", &uri, Some("admin-token"), None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_soft_delete_requires_admin() {
    let mut services = MockServiceContainer::new();
    services.expect_lifecycle().never();
    let app = app(services, auth());
    let uri = format!("/offices/{}", Uuid::new_v4());

    let (status, body) = send(app, request("DELETE", &uri, Some("user-token"), None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_soft_delete_passes_acting_user() {
    let office_id = Uuid::new_v4();
    let mut lifecycle = MockLifecycle::new();
    lifecycle
        .expect_soft_delete()
        .withf(move |kind, id, acting| {
            *kind == EntityKind::Office && *id == office_id && *acting == ADMIN_ID
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let app = app(with_lifecycle(lifecycle), auth());
    let uri = format!("/offices/{}", office_id);

    let (status, _) = send(app, request("DELETE", &uri, Some("admin-token"), None)).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_lifecycle_errors_map_to_status_codes() {
    let id = Uuid::new_v4();
    let cases = [
        (
            LifecycleError::AlreadyDeleted { entity: EntityKind::Device, id },
            StatusCode::BAD_REQUEST,
            "INVALID_STATE_TRANSITION",
        ),
        (
            LifecycleError::NotFound { entity: EntityKind::Device, id },
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
        ),
        (
            LifecycleError::SelfModificationForbidden,
            StatusCode::BAD_REQUEST,
            "SELF_MODIFICATION_FORBIDDEN",
        ),
        (
            LifecycleError::dependency("usage delete failed: disk I/O"),
            StatusCode::INTERNAL_SERVER_ERROR,
            "DEPENDENCY_FAILURE",
        ),
    ];

    for (error, expected_status, expected_code) in cases {
        let mut lifecycle = MockLifecycle::new();
        let returned = error.clone();
        lifecycle
            .expect_soft_delete()
            .returning(move |_, _, _| Err(returned.clone()));
        let app = app(with_lifecycle(lifecycle), auth());
        let uri = format!("/devices/{}", id);

        let (status, body) = send(app, request("DELETE", &uri, Some("admin-token"), None)).await;

        assert_eq!(status, expected_status, "{:?}", error);
        assert_eq!(body["error"]["code"], expected_code);
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("disk I/O"));
    }
}

#[tokio::test]
async fn test_restore_only_needs_bearer() {
    let mut lifecycle = MockLifecycle::new();
    lifecycle
        .expect_restore()
        .returning(|_, _| Err(LifecycleError::NotDeleted { entity: EntityKind::User, id: USER_ID }));
    let app = app(with_lifecycle(lifecycle), auth());
    let uri = format!("/users/{}/restore", USER_ID);

    let (status, body) = send(app, request("POST", &uri, Some("user-token"), None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "User not found or not deleted");
}

#[tokio::test]
async fn test_usage_payload_validation() {
    let app = app(MockServiceContainer::new(), auth());
    let body = json!({
        "device_id": Uuid::new_v4(),
        "button_number": 0,
        "start_time": "2024-03-04T09:00:00Z",
        "end_time": "2024-03-04T09:05:00Z"
    });

    let (status, body) = send(app, request("POST", "/usage", Some("user-token"), Some(body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Button number must be positive");
}

#[tokio::test]
async fn test_login_returns_token() {
    let mut auth = MockAuthService::new();
    auth.expect_login()
        .withf(|login, password| login == "dr_smile" && password == "password123")
        .returning(|_, _| {
            Ok(TokenResponse {
                access_token: "signed".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 86_400,
            })
        });
    let app = app(MockServiceContainer::new(), auth);
    let body = json!({ "login": "dr_smile", "password": "password123" });

    let (status, body) = send(app, request("POST", "/auth/login", None, Some(body))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "signed");
}

#[tokio::test]
async fn test_public_payment_link_opens_anonymous_intent() {
    let invoice_id = Uuid::new_v4();
    let mut payments = MockPaymentService::new();
    payments
        .expect_create_for_invoice()
        .withf(move |id, user| *id == invoice_id && user.is_none())
        .times(1)
        .returning(|invoice_id, _| {
            let now = Utc::now();
            Ok(PaymentCheckout {
                intent: PaymentIntent {
                    id: Uuid::new_v4(),
                    external_intent_id: "pi_123".to_string(),
                    invoice_id,
                    office_id: Uuid::new_v4(),
                    user_id: None,
                    amount: Money::from_cents(29_900),
                    currency: "usd".to_string(),
                    status: "requires_payment_method".to_string(),
                    created_at: now,
                    updated_at: now,
                },
                client_secret: Some("pi_123_secret".to_string()),
            })
        });
    let payments: Arc<dyn PaymentService> = Arc::new(payments);
    let mut services = MockServiceContainer::new();
    services
        .expect_payments()
        .returning(move || payments.clone());
    let app = app(services, MockAuthService::new());
    let uri = format!("/public/invoices/{}/payment-intent", invoice_id);

    let (status, body) = send(app, request("POST", &uri, None, None)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["intent"]["amount"], 29_900);
    assert_eq!(body["client_secret"], "pi_123_secret");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app(MockServiceContainer::new(), MockAuthService::new());

    let (status, body) = send(app, request("GET", "/api-docs/openapi.json", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/offices/{id}/permanent"].is_object());
}
