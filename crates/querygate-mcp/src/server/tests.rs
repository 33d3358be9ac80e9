// querygate-mcp/src/server/tests.rs
// ============================================================================
// Module: Gateway Server Unit Tests
// Description: Unit tests for transport framing and status mapping.
// Purpose: Validate stdio line handling and HTTP rendering rules.
// Dependencies: querygate-mcp, querygate-core, querygate-policy
// ============================================================================

//! ## Overview
//! Exercises the stdio line responder and the HTTP rendering helpers with an
//! in-memory dispatcher.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::StatusCode;
use querygate_core::ExecutionError;
use querygate_core::InvocationContext;
use querygate_core::Tool;
use querygate_core::ToolRegistry;
use querygate_policy::AllowAllGate;
use serde_json::Value;
use serde_json::json;

use super::render_http;
use super::rpc_status;
use super::stdio_response;
use super::transport_headers;
use crate::audit::NoopAuditSink;
use crate::dispatch::Dispatcher;
use crate::dispatch::GatewayResponse;
use crate::rpc::CODE_FORBIDDEN;
use crate::rpc::CODE_INVALID_REQUEST;
use crate::rpc::CODE_UNKNOWN_TOOL;
use crate::rpc::JsonRpcResponse;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Echo tool for transport-level tests.
struct EchoTool;

impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object"})
    }

    fn execute(&self, _ctx: &InvocationContext, args: &Value) -> Result<Value, ExecutionError> {
        Ok(args.clone())
    }
}

/// Dispatcher over the echo tool with authorization bypassed.
fn sample_dispatcher() -> Dispatcher {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(EchoTool));
    Dispatcher::new(Arc::new(registry), Arc::new(AllowAllGate), Arc::new(NoopAuditSink), None)
}

// ============================================================================
// SECTION: Stdio Framing
// ============================================================================

#[test]
fn stdio_oversize_line_is_rejected() {
    let dispatcher = sample_dispatcher();
    let line = "x".repeat(64);
    let response = stdio_response(&dispatcher, &line, 32);
    assert_eq!(response.error_code(), Some(CODE_INVALID_REQUEST));
}

#[test]
fn stdio_invalid_json_is_rejected_with_one_response() {
    let dispatcher = sample_dispatcher();
    let response = stdio_response(&dispatcher, "{not json", 1024);
    assert_eq!(response.error_code(), Some(CODE_INVALID_REQUEST));
}

#[test]
fn stdio_executes_json_rpc_line() {
    let dispatcher = sample_dispatcher();
    let line = r#"{"jsonrpc":"2.0","id":"9","method":"tools/execute","params":{"name":"echo","arguments":{"k":"v"}}}"#;
    let response = stdio_response(&dispatcher, line, 4096);
    assert_eq!(response.id, "9");
    assert!(response.error.is_none());
    let result = response.result.expect("result");
    assert_eq!(result["output"], json!({"k": "v"}));
}

#[test]
fn stdio_unknown_tool_line_maps_to_unknown_tool_code() {
    let dispatcher = sample_dispatcher();
    let line = r#"{"jsonrpc":"2.0","id":"9","method":"tools/execute","params":{"name":"missing"}}"#;
    let response = stdio_response(&dispatcher, line, 4096);
    assert_eq!(response.error_code(), Some(CODE_UNKNOWN_TOOL));
}

// ============================================================================
// SECTION: HTTP Rendering
// ============================================================================

#[test]
fn rpc_status_maps_success_denial_and_protocol_errors() {
    let ok = JsonRpcResponse::ok("1".to_string(), json!({}));
    assert_eq!(rpc_status(&ok), StatusCode::OK);

    let denied =
        JsonRpcResponse::err("1".to_string(), CODE_FORBIDDEN, "Forbidden by policy".to_string());
    assert_eq!(rpc_status(&denied), StatusCode::FORBIDDEN);

    let unknown =
        JsonRpcResponse::err("1".to_string(), CODE_UNKNOWN_TOOL, "Unknown tool: x".to_string());
    assert_eq!(rpc_status(&unknown), StatusCode::BAD_REQUEST);
}

#[test]
fn plain_failures_render_as_bad_request_error_object() {
    let (status, body) = render_http(GatewayResponse::Plain {
        message: "Missing 'name'".to_string(),
    });
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.0, json!({"error": "Missing 'name'"}));
}

#[test]
fn discovery_renders_as_ok_payload() {
    let (status, body) = render_http(GatewayResponse::Discovery(json!({"tools": []})));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.0["tools"], json!([]));
}

#[test]
fn transport_headers_are_extracted_when_present() {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", "Bearer token".parse().expect("header"));
    headers.insert("x-tenant", "acme".parse().expect("header"));
    let extracted = transport_headers(&headers);
    assert_eq!(extracted.authorization.as_deref(), Some("Bearer token"));
    assert_eq!(extracted.tenant.as_deref(), Some("acme"));

    let empty = transport_headers(&HeaderMap::new());
    assert!(empty.authorization.is_none());
    assert!(empty.tenant.is_none());
}
