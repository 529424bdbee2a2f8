//! `POST /call`, the single tool entry point.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use crate::error::{ApiError, ErrorCode};
use crate::state::AppState;
use crate::tools::{CallBody, ToolError, ToolRequest, ToolResult};

/// Dispatch `{ tool, args }` and wrap the result.
///
/// Body rejections (bad JSON, wrong content type) are reported with the same
/// `{ error }` envelope as tool errors.
pub async fn call_tool(
    State(state): State<AppState>,
    body: Result<Json<CallBody>, JsonRejection>,
) -> Result<Json<ToolResult>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let request = ToolRequest::try_from(body).map_err(|e| {
        info!(code = e.error_code(), error = %e, "call: rejected");
        tool_error_to_api(e)
    })?;

    let result = state
        .dispatcher
        .dispatch(&request.tool, &request.args)
        .await
        .map_err(tool_error_to_api)?;

    Ok(Json(result))
}

pub(crate) fn tool_error_to_status(err: &ToolError) -> StatusCode {
    match err {
        ToolError::InvalidTool(_) | ToolError::Validation(_) => StatusCode::BAD_REQUEST,
        ToolError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn tool_error_to_api(err: ToolError) -> ApiError {
    ApiError::new(tool_error_to_status(&err), err.to_string())
}
