//! Tools reachable through `POST /call`.
//!
//! ARCHITECTURE
//! ============
//! `types` turns the loose request into a closed `ToolCall`, `dispatch`
//! executes it against the injected collaborators, and `catalog` describes
//! the same tool set for discovery endpoints.

pub mod catalog;
pub mod dispatch;
pub mod types;

pub use dispatch::Dispatcher;
pub use types::{CallBody, ToolError, ToolRequest, ToolResult};
