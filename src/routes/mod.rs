//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the HTTP endpoints under a single Axum router. Every
//! route answers JSON; failures always use the `{ error }` envelope from
//! `crate::error`.

pub mod call;
pub mod leads;
pub mod meta;

use axum::Router;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/call", post(call::call_tool))
        .route("/mcp", get(meta::mcp))
        .route("/manifest", get(meta::mcp))
        .route("/health", get(meta::health))
        .route("/lead/{id}", get(leads::get_lead))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
