//! API Gateway Library
//!
//! HTTP REST API of the Lune billing platform. Handlers call the billing
//! and auth services in-process through the shared application state.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tracing::info;

use crate::routes::create_router;
use crate::state::AppState;

/// Serve the API on the given address until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
