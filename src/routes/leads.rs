//! Lead lookup route.

use axum::extract::{Path, State};
use axum::response::Json;
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ErrorCode};
use crate::state::AppState;
use crate::store::Lead;

const LEAD_NOT_FOUND: &str = "Lead not found";

/// `GET /lead/{id}`: fetch one lead. Unparseable ids are simply not found.
pub async fn get_lead(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Lead>, ApiError> {
    let Ok(id) = Uuid::parse_str(id.trim()) else {
        return Err(ApiError::not_found(LEAD_NOT_FOUND));
    };

    match state.store.get_lead(id).await {
        Ok(Some(lead)) => Ok(Json(lead)),
        Ok(None) => Err(ApiError::not_found(LEAD_NOT_FOUND)),
        Err(e) => {
            warn!(%id, code = e.error_code(), error = %e, "lead: lookup failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}
