//! Tool dispatcher: a validated call becomes one datastore or webhook round trip.
//!
//! DESIGN
//! ======
//! The dispatcher owns no state of its own. Its collaborators are injected
//! as trait objects so tests can count calls and production can pick a
//! datastore backend at startup. Validation always completes before any
//! collaborator is touched.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::types::{ToolCall, ToolError, ToolOutput, ToolResult};
use crate::error::ErrorCode;
use crate::store::LeadStore;
use crate::webhook::MessageRelay;

#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn LeadStore>,
    relay: Arc<dyn MessageRelay>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(store: Arc<dyn LeadStore>, relay: Arc<dyn MessageRelay>) -> Self {
        Self { store, relay }
    }

    /// Parse, validate and run one tool.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidTool`] or [`ToolError::Validation`] with no side
    /// effect, or [`ToolError::Upstream`] if the collaborator call fails.
    pub async fn dispatch(&self, tool: &str, args: &Map<String, Value>) -> Result<ToolResult, ToolError> {
        let result = match ToolCall::parse(tool, args) {
            Ok(call) => self.execute(call).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => info!(tool, "tool: dispatched"),
            Err(e) if e.is_client_error() => info!(tool, code = e.error_code(), error = %e, "tool: rejected"),
            Err(e) => warn!(tool, code = e.error_code(), retryable = e.retryable(), error = %e, "tool: upstream failed"),
        }

        result
    }

    /// Run an already-validated call.
    ///
    /// # Errors
    ///
    /// [`ToolError::Upstream`] if the datastore or webhook call fails.
    pub async fn execute(&self, call: ToolCall) -> Result<ToolResult, ToolError> {
        let data = match call {
            ToolCall::ViewLeads => {
                let leads = self.store.list_leads().await?;
                info!(count = leads.len(), "tool: view_leads");
                ToolOutput::Leads(leads)
            }
            ToolCall::SetupAutoReply(args) => {
                let lead = self.store.insert_lead(&args.into()).await?;
                info!(lead_id = %lead.id, keyword = %lead.keyword, "tool: auto-reply saved");
                ToolOutput::Lead(lead)
            }
            ToolCall::SendMessage(args) => {
                let body = self.relay.send(&args.into()).await?;
                ToolOutput::Delivery(body)
            }
        };
        Ok(ToolResult::ok(data))
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
