use super::*;
use serde_json::json;

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn validation_fields(err: &ToolError) -> Vec<&'static str> {
    match err {
        ToolError::Validation(errors) => errors.iter().map(|e| e.field).collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

// =========================================================================
// ToolName
// =========================================================================

#[test]
fn tool_name_parse_round_trips_every_name() {
    for name in ToolName::ALL {
        assert_eq!(ToolName::parse(name.as_str()), Some(name));
    }
}

#[test]
fn tool_name_parse_is_exact() {
    assert_eq!(ToolName::parse("View_Leads"), None);
    assert_eq!(ToolName::parse(" view_leads"), None);
    assert_eq!(ToolName::parse(""), None);
}

// =========================================================================
// CallBody -> ToolRequest
// =========================================================================

#[test]
fn request_accepts_missing_args_as_empty() {
    let body: CallBody = serde_json::from_value(json!({ "tool": "view_leads" })).unwrap();
    let req = ToolRequest::try_from(body).unwrap();
    assert_eq!(req.tool, "view_leads");
    assert!(req.args.is_empty());
}

#[test]
fn request_accepts_null_args_as_empty() {
    let body: CallBody = serde_json::from_value(json!({ "tool": "view_leads", "args": null })).unwrap();
    assert!(ToolRequest::try_from(body).unwrap().args.is_empty());
}

#[test]
fn request_missing_tool_names_tool_field() {
    let body: CallBody = serde_json::from_value(json!({ "args": {} })).unwrap();
    let err = ToolRequest::try_from(body).unwrap_err();
    assert_eq!(validation_fields(&err), vec!["tool"]);
    assert!(err.to_string().contains("tool is required"));
}

#[test]
fn request_non_string_tool_and_array_args_both_reported() {
    let body: CallBody = serde_json::from_value(json!({ "tool": 7, "args": ["x"] })).unwrap();
    let err = ToolRequest::try_from(body).unwrap_err();
    assert_eq!(validation_fields(&err), vec!["tool", "args"]);
    assert_eq!(err.to_string(), "tool must be a string; args must be an object");
}

#[test]
fn request_known_tool_with_array_args_names_args_field() {
    let body: CallBody = serde_json::from_value(json!({ "tool": "send_message", "args": [1] })).unwrap();
    let err = ToolRequest::try_from(body).unwrap_err();
    assert_eq!(validation_fields(&err), vec!["args"]);
    assert_eq!(err.to_string(), "args must be an object");
}

#[test]
fn request_unknown_tool_wins_over_bad_args_shape() {
    let body: CallBody = serde_json::from_value(json!({ "tool": "explode", "args": [1] })).unwrap();
    let err = ToolRequest::try_from(body).unwrap_err();
    assert!(matches!(&err, ToolError::InvalidTool(name) if name == "explode"));
    assert_eq!(err.to_string(), "Unknown tool: 'explode'");
}

#[test]
fn request_blank_tool_is_validation_error() {
    let body: CallBody = serde_json::from_value(json!({ "tool": "   " })).unwrap();
    let err = ToolRequest::try_from(body).unwrap_err();
    assert_eq!(validation_fields(&err), vec!["tool"]);
}

// =========================================================================
// ToolCall::parse
// =========================================================================

#[test]
fn parse_unknown_tool_is_invalid_tool_naming_value() {
    let err = ToolCall::parse("delete_everything", &Map::new()).unwrap_err();
    assert!(matches!(&err, ToolError::InvalidTool(name) if name == "delete_everything"));
    assert_eq!(err.to_string(), "Unknown tool: 'delete_everything'");
    assert_eq!(err.error_code(), "E_INVALID_TOOL");
}

#[test]
fn parse_unknown_tool_ignores_bad_args() {
    // Name resolution happens before any argument is inspected.
    let err = ToolCall::parse("nope", &args(json!({ "keyword": 42 }))).unwrap_err();
    assert!(matches!(err, ToolError::InvalidTool(_)));
}

#[test]
fn parse_view_leads_ignores_args() {
    let call = ToolCall::parse("view_leads", &args(json!({ "anything": [1, 2] }))).unwrap();
    assert_eq!(call, ToolCall::ViewLeads);
}

#[test]
fn parse_setup_auto_reply_trims_values() {
    let call = ToolCall::parse("setup_auto_reply", &args(json!({ "keyword": "  hello ", "reply": "\thi there\n" })))
        .unwrap();
    assert_eq!(
        call,
        ToolCall::SetupAutoReply(AutoReplyArgs { keyword: "hello".into(), reply: "hi there".into() })
    );
}

#[test]
fn parse_setup_auto_reply_blank_keyword_names_keyword() {
    let err = ToolCall::parse("setup_auto_reply", &args(json!({ "keyword": "   ", "reply": "hi" }))).unwrap_err();
    assert_eq!(validation_fields(&err), vec!["keyword"]);
    assert_eq!(err.to_string(), "keyword is required and must be a non-empty string");
}

#[test]
fn parse_setup_auto_reply_reports_every_bad_field() {
    let err = ToolCall::parse("setup_auto_reply", &Map::new()).unwrap_err();
    assert_eq!(validation_fields(&err), vec!["keyword", "reply"]);
    assert_eq!(err.error_code(), "E_VALIDATION");
    assert!(err.is_client_error());
}

#[test]
fn parse_send_message_non_string_phone_names_phone() {
    let err = ToolCall::parse("send_message", &args(json!({ "phone": 5_550_100, "message": "hi" }))).unwrap_err();
    assert_eq!(validation_fields(&err), vec!["phone"]);
    assert_eq!(err.to_string(), "phone must be a string");
}

#[test]
fn parse_send_message_null_message_is_missing() {
    let err = ToolCall::parse("send_message", &args(json!({ "phone": "555-0100", "message": null }))).unwrap_err();
    assert_eq!(validation_fields(&err), vec!["message"]);
}

#[test]
fn parse_send_message_valid() {
    let call = ToolCall::parse("send_message", &args(json!({ "phone": "555-0100", "message": "hi" }))).unwrap();
    assert_eq!(call, ToolCall::SendMessage(MessageArgs { phone: "555-0100".into(), message: "hi".into() }));
}

// =========================================================================
// ToolResult / ToolError
// =========================================================================

#[test]
fn tool_result_serializes_ok_envelope() {
    let result = ToolResult::ok(ToolOutput::Leads(Vec::new()));
    assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "status": "ok", "data": [] }));
}

#[test]
fn tool_result_forwards_webhook_body_verbatim() {
    let body = json!({ "queued": true, "id": "msg-1", "nested": { "a": [1, 2] } });
    let result = ToolResult::ok(ToolOutput::Delivery(body.clone()));
    assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "status": "ok", "data": body }));
}

#[test]
fn upstream_error_carries_store_message() {
    let err = ToolError::from(StoreError::Conflict("duplicate key".into()));
    assert_eq!(err.error_code(), "E_UPSTREAM");
    assert!(!err.is_client_error());
    assert!(err.to_string().contains("duplicate key"));
    assert!(!err.retryable());
}

#[test]
fn upstream_webhook_503_is_retryable() {
    let err = ToolError::from(WebhookError::Status { status: 503, body: String::new() });
    assert!(err.retryable());
    assert_eq!(err.to_string(), "webhook failed with status: 503");
}
