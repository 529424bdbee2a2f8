//! Static capability listing served at `/mcp` and `/manifest`.

use serde::Serialize;

use super::types::ToolName;

pub const SERVICE_NAME: &str = "SmartChat Assistant";
pub const SERVICE_DESCRIPTION: &str = "An assistant for managing auto-reply leads and sending messages.";

/// One advertised tool. `input_schema` is a JSON-schema object.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub name: &'static str,
    pub description: &'static str,
    pub tools: Vec<ToolSpec>,
}

/// Describe a single tool. Required keys come from [`ToolName::required_args`].
#[must_use]
pub fn tool_spec(name: ToolName) -> ToolSpec {
    let (title, description, properties) = match name {
        ToolName::ViewLeads => ("View Leads", "Return all saved auto-reply leads.", serde_json::json!({})),
        ToolName::SetupAutoReply => (
            "Setup Auto Reply",
            "Configure a keyword-based auto-reply. Keywords are unique.",
            serde_json::json!({
                "keyword": { "type": "string", "description": "Incoming keyword that triggers the reply" },
                "reply": { "type": "string", "description": "Reply text sent back for the keyword" }
            }),
        ),
        ToolName::SendMessage => (
            "Send Message",
            "Send a WhatsApp message through the delivery webhook.",
            serde_json::json!({
                "phone": { "type": "string", "description": "Recipient phone number" },
                "message": { "type": "string", "description": "Message text" }
            }),
        ),
    };

    ToolSpec {
        id: name.as_str(),
        name: title,
        description,
        input_schema: serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": name.required_args(),
        }),
    }
}

/// The full listing, in [`ToolName::ALL`] order.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog {
        name: SERVICE_NAME,
        description: SERVICE_DESCRIPTION,
        tools: ToolName::ALL.into_iter().map(tool_spec).collect(),
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
