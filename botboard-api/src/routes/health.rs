//! Health check endpoint
//!
//! `GET /health` reports service status and database connectivity, reusing
//! the pool health check that also gates startup.

use crate::app::AppState;
use axum::{extract::State, Json};
use botboard_shared::db::pool;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status: "healthy" or "degraded"
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status: "connected" or "disconnected"
    pub database: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = pool::health_check(&state.db).await.is_ok();

    let (status, database) = if connected {
        ("healthy", "connected")
    } else {
        ("degraded", "disconnected")
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}
