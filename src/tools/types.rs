//! Tool request types, argument validation, and the error taxonomy.
//!
//! A request arrives as an opaque tool name plus a loose JSON argument bag.
//! `ToolCall::parse` turns it into a closed enum carrying validated, trimmed
//! arguments, or fails before anything touches the datastore or webhook.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ErrorCode;
use crate::store::{Lead, NewLead, StoreError};
use crate::webhook::{OutboundMessage, WebhookError};

// =============================================================================
// TOOL NAMES
// =============================================================================

/// The fixed tool set. Not extensible at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ViewLeads,
    SetupAutoReply,
    SendMessage,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [Self::ViewLeads, Self::SetupAutoReply, Self::SendMessage];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewLeads => "view_leads",
            Self::SetupAutoReply => "setup_auto_reply",
            Self::SendMessage => "send_message",
        }
    }

    /// Exact, case-sensitive match against the wire identifier.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == raw)
    }

    /// Argument keys that must be present and non-blank.
    #[must_use]
    pub fn required_args(self) -> &'static [&'static str] {
        match self {
            Self::ViewLeads => &[],
            Self::SetupAutoReply => &["keyword", "reply"],
            Self::SendMessage => &["phone", "message"],
        }
    }
}

// =============================================================================
// WIRE REQUEST
// =============================================================================

/// Raw `POST /call` body. Both fields are loosely typed until checked.
#[derive(Debug, Default, Deserialize)]
pub struct CallBody {
    #[serde(default)]
    pub tool: Value,
    #[serde(default)]
    pub args: Value,
}

/// A known tool name plus its argument bag, shape-checked but not yet
/// validated against that tool's required arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    pub tool: String,
    pub args: Map<String, Value>,
}

impl TryFrom<CallBody> for ToolRequest {
    type Error = ToolError;

    fn try_from(body: CallBody) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let tool = match body.tool {
            // Unknown names fail before the argument bag is looked at.
            Value::String(s) if !s.trim().is_empty() => match ToolName::parse(&s) {
                Some(_) => Some(s),
                None => return Err(ToolError::InvalidTool(s)),
            },
            Value::String(_) => {
                errors.push(FieldError::new("tool", FieldProblem::Blank));
                None
            }
            Value::Null => {
                errors.push(FieldError::new("tool", FieldProblem::Missing));
                None
            }
            _ => {
                errors.push(FieldError::new("tool", FieldProblem::NotString));
                None
            }
        };

        let args = match body.args {
            Value::Object(map) => Some(map),
            Value::Null => Some(Map::new()),
            _ => {
                errors.push(FieldError::new("args", FieldProblem::NotObject));
                None
            }
        };

        match (tool, args) {
            (Some(tool), Some(args)) => Ok(Self { tool, args }),
            _ => Err(ToolError::Validation(errors)),
        }
    }
}

// =============================================================================
// VALIDATED CALLS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoReplyArgs {
    pub keyword: String,
    pub reply: String,
}

impl From<AutoReplyArgs> for NewLead {
    fn from(args: AutoReplyArgs) -> Self {
        Self { keyword: args.keyword, reply: args.reply }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageArgs {
    pub phone: String,
    pub message: String,
}

impl From<MessageArgs> for OutboundMessage {
    fn from(args: MessageArgs) -> Self {
        Self { phone: args.phone, message: args.message }
    }
}

/// A fully validated tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    ViewLeads,
    SetupAutoReply(AutoReplyArgs),
    SendMessage(MessageArgs),
}

impl ToolCall {
    /// Resolve `tool` and validate every required argument in one pass.
    ///
    /// Unknown args are ignored. String values are trimmed.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidTool`] for an unrecognized name (args are not
    /// inspected), otherwise [`ToolError::Validation`] listing every
    /// offending field.
    pub fn parse(tool: &str, args: &Map<String, Value>) -> Result<Self, ToolError> {
        let name = ToolName::parse(tool).ok_or_else(|| ToolError::InvalidTool(tool.to_string()))?;

        let mut errors = Vec::new();
        let mut take = |field: &'static str| required_string(args, field, &mut errors);

        let call = match name {
            ToolName::ViewLeads => Some(Self::ViewLeads),
            ToolName::SetupAutoReply => match (take("keyword"), take("reply")) {
                (Some(keyword), Some(reply)) => Some(Self::SetupAutoReply(AutoReplyArgs { keyword, reply })),
                _ => None,
            },
            ToolName::SendMessage => match (take("phone"), take("message")) {
                (Some(phone), Some(message)) => Some(Self::SendMessage(MessageArgs { phone, message })),
                _ => None,
            },
        };

        call.ok_or(ToolError::Validation(errors))
    }
}

fn required_string(args: &Map<String, Value>, field: &'static str, errors: &mut Vec<FieldError>) -> Option<String> {
    let problem = match args.get(field) {
        None | Some(Value::Null) => FieldProblem::Missing,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
            FieldProblem::Blank
        }
        Some(_) => FieldProblem::NotString,
    };
    errors.push(FieldError::new(field, problem));
    None
}

// =============================================================================
// RESULTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Ok,
}

/// Tool-specific success payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Leads(Vec<Lead>),
    Lead(Lead),
    /// Webhook response body, forwarded verbatim.
    Delivery(Value),
}

/// Success envelope: `{ "status": "ok", "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub status: ToolStatus,
    pub data: ToolOutput,
}

impl ToolResult {
    #[must_use]
    pub fn ok(data: ToolOutput) -> Self {
        Self { status: ToolStatus::Ok, data }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Blank,
    NotString,
    NotObject,
}

/// One offending argument, named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub problem: FieldProblem,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &'static str, problem: FieldProblem) -> Self {
        Self { field, problem }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match self.problem {
            FieldProblem::Missing | FieldProblem::Blank => {
                write!(f, "{field} is required and must be a non-empty string")
            }
            FieldProblem::NotString => write!(f, "{field} must be a string"),
            FieldProblem::NotObject => write!(f, "{field} must be an object"),
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// A datastore or webhook failure.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: '{0}'")]
    InvalidTool(String),
    #[error("{}", join_fields(.0))]
    Validation(Vec<FieldError>),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ToolError {
    /// `true` for errors caused by the request itself.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidTool(_) | Self::Validation(_))
    }
}

impl From<StoreError> for ToolError {
    fn from(e: StoreError) -> Self {
        Self::Upstream(UpstreamError::Store(e))
    }
}

impl From<WebhookError> for ToolError {
    fn from(e: WebhookError) -> Self {
        Self::Upstream(UpstreamError::Webhook(e))
    }
}

impl ErrorCode for ToolError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTool(_) => "E_INVALID_TOOL",
            Self::Validation(_) => "E_VALIDATION",
            Self::Upstream(_) => "E_UPSTREAM",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Upstream(UpstreamError::Store(e)) => e.retryable(),
            Self::Upstream(UpstreamError::Webhook(e)) => e.retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
