//! Main HTTP gateway server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use geoclass_media::MAX_UPLOAD_BYTES;
use geoclass_pipeline::ClassificationPipeline;

use crate::classify_api;
use crate::health_api;

/// Headroom on top of the upload cap for multipart boundaries and headers,
/// so a slightly oversized file still reaches the handler's own size check.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Which upstream credentials were configured at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialStatus {
    pub florence: bool,
    pub nvidia: bool,
}

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<ClassificationPipeline>,
    pub credentials: CredentialStatus,
    pub max_upload_bytes: usize,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(pipeline: ClassificationPipeline, credentials: CredentialStatus) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            credentials,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            started_at: Instant::now(),
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build the router with all routes and layers.
pub fn build_router(state: GatewayState) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(health_api::index))
        .route("/health", get(health_api::get_health))
        .route("/classify-country", post(classify_api::classify_country))
        .route("/classify-country/", post(classify_api::classify_country))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Gateway HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
