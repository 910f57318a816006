//! Health and index endpoints.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct ApiKeyStatus {
    pub florence: &'static str,
    pub nvidia: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub api_keys: ApiKeyStatus,
}

fn presence(configured: bool) -> &'static str {
    if configured { "Present" } else { "Missing" }
}

/// Handler for `GET /health`
///
/// Liveness only; the upstream services are not probed.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy".into(),
        message: "Country Classifier API is running".into(),
        timestamp: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        api_keys: ApiKeyStatus {
            florence: presence(state.credentials.florence),
            nvidia: presence(state.credentials.nvidia),
        },
    })
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub classify: &'static str,
    pub health: &'static str,
}

#[derive(Debug, Serialize)]
pub struct IndexInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

/// Handler for `GET /`
pub async fn index() -> Json<IndexInfo> {
    Json(IndexInfo {
        message: "Country Classifier API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            classify: "POST /classify-country/",
            health: "GET /health",
        },
    })
}
