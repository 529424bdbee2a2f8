//! Discovery and liveness routes. No side effects.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::state::AppState;
use crate::tools::catalog::{self, Catalog};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds since the router state was built.
    pub uptime: f64,
}

/// `GET /mcp` and `GET /manifest` return the static tool listing.
pub async fn mcp() -> Json<Catalog> {
    Json(catalog::catalog())
}

/// `GET /health`: process liveness.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", uptime: state.started_at.elapsed().as_secs_f64() })
}
