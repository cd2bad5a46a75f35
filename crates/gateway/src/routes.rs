//! Route configuration.

use axum::{
    http::{HeaderValue, Method},
    middleware, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    auth_routes, dashboard_routes, device_routes, health_routes, invoice_routes, office_routes,
    payment_routes, public_routes, usage_routes, user_routes,
};
use crate::middleware::auth_middleware;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let bearer = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        // Health check (no auth)
        .nest("/health", health_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Auth routes (only /auth/me requires a token)
        .nest("/auth", auth_routes(state.clone()))
        // Payment links (no auth)
        .nest("/public", public_routes())
        // Everything else requires a bearer token; admin checks happen per handler
        .nest("/offices", office_routes().route_layer(bearer()))
        .nest("/devices", device_routes().route_layer(bearer()))
        .nest("/invoices", invoice_routes().route_layer(bearer()))
        .nest("/usage", usage_routes().route_layer(bearer()))
        .nest("/users", user_routes().route_layer(bearer()))
        .nest("/dashboard", dashboard_routes().route_layer(bearer()))
        .nest("/payments", payment_routes().route_layer(bearer()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy; an empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
