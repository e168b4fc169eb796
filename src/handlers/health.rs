//! Health check endpoints.
//!
//! Mounted at `/health`, outside the route table and its middleware.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
}

/// Liveness probe - server is running
///
/// GET /health/live
async fn liveness(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    /// Routes in the table
    pub routes: usize,
    /// Registered controller actions
    pub actions: usize,
    /// Handlers referenced by routes with no registered action
    pub unregistered_handlers: usize,
}

/// Readiness probe - route table loaded
///
/// GET /health/ready
async fn readiness(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let routes = state.routes.len();

    Json(ReadinessResponse {
        status: if routes > 0 { "ready" } else { "not_ready" },
        routes,
        actions: state.actions.len(),
        unregistered_handlers: state.actions.missing(&state.routes).len(),
    })
}

/// Create health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}
