use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// `GET /health`. Always 200; the database ping result is reported in the body.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.health.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(subsystem = "health", error = %e, "Database ping failed");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
