// querygate-policy/tests/pdp_client.rs
// ============================================================================
// Module: PDP Client Tests
// Description: Tests for the policy decision point client.
// Purpose: Validate decision decoding and fail-open/fail-closed postures.
// Dependencies: querygate-policy, querygate-config, tiny_http
// ============================================================================

//! ## Overview
//! Tests the PDP client against a local stub server for:
//! - Decision decoding: `{"result": true}` / `{"result": false}`
//! - Malformed responses resolving per the configured posture
//! - Unreachable endpoints resolving per the configured posture
//! - The decision request wire shape (`input` wrapper)

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::thread;

use querygate_config::FailMode;
use querygate_config::PolicyConfig;
use querygate_policy::PdpClient;
use querygate_policy::PolicyGate;
use querygate_policy::PolicyQuery;
use serde_json::Value;
use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Spawns a stub PDP that answers one request with the given body.
fn spawn_pdp(body: &'static str, status: u16) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });

    (url, handle)
}

/// Spawns a stub PDP that captures the request body before answering.
fn spawn_capturing_pdp(body: &'static str) -> (String, thread::JoinHandle<Value>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut captured = String::new();
        request.as_reader().read_to_string(&mut captured).unwrap();
        let response = Response::from_string(body).with_status_code(200);
        let _ = request.respond(response);
        serde_json::from_str(&captured).unwrap()
    });

    (url, handle)
}

/// Builds a client pointed at the given base URL with the given posture.
fn client(base_url: &str, fail_mode: FailMode) -> PdpClient {
    PdpClient::from_config(&PolicyConfig {
        base_url: Some(base_url.to_string()),
        decision_path: "/v1/data/querygate/allow".to_string(),
        timeout_ms: 2_000,
        fail_mode,
        require_auth: true,
    })
    .unwrap()
}

/// Sample decision query for a customer lookup.
fn sample_query<'a>(args: &'a Value) -> PolicyQuery<'a> {
    PolicyQuery {
        principal: Some("Bearer analyst-token"),
        tenant: Some("acme"),
        tool: "getCustomerByEmail",
        args,
    }
}

// ============================================================================
// SECTION: Decision Decoding
// ============================================================================

#[test]
fn allow_decision_is_honored() {
    let (url, handle) = spawn_pdp(r#"{"result": true}"#, 200);
    let args = json!({"email": "a@b.com"});
    assert!(client(&url, FailMode::Closed).is_allowed(&sample_query(&args)));
    handle.join().unwrap();
}

#[test]
fn deny_decision_is_honored_even_fail_open() {
    let (url, handle) = spawn_pdp(r#"{"result": false}"#, 200);
    let args = json!({"email": "a@b.com"});
    assert!(!client(&url, FailMode::Open).is_allowed(&sample_query(&args)));
    handle.join().unwrap();
}

#[test]
fn missing_result_field_resolves_per_posture() {
    let (url, handle) = spawn_pdp(r#"{"decision_id": "abc"}"#, 200);
    let args = json!({});
    assert!(!client(&url, FailMode::Closed).is_allowed(&sample_query(&args)));
    handle.join().unwrap();

    let (url, handle) = spawn_pdp(r#"{"decision_id": "abc"}"#, 200);
    assert!(client(&url, FailMode::Open).is_allowed(&sample_query(&args)));
    handle.join().unwrap();
}

#[test]
fn non_json_body_resolves_per_posture() {
    let (url, handle) = spawn_pdp("not json", 200);
    let args = json!({});
    assert!(!client(&url, FailMode::Closed).is_allowed(&sample_query(&args)));
    handle.join().unwrap();
}

#[test]
fn http_error_status_resolves_per_posture() {
    let (url, handle) = spawn_pdp("server error", 500);
    let args = json!({});
    assert!(!client(&url, FailMode::Closed).is_allowed(&sample_query(&args)));
    handle.join().unwrap();

    let (url, handle) = spawn_pdp("server error", 500);
    assert!(client(&url, FailMode::Open).is_allowed(&sample_query(&args)));
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Unreachable PDP
// ============================================================================

#[test]
fn unreachable_pdp_fails_closed() {
    // Reserved port with no listener.
    let args = json!({});
    assert!(!client("http://127.0.0.1:9", FailMode::Closed).is_allowed(&sample_query(&args)));
}

#[test]
fn unreachable_pdp_fails_open_when_configured() {
    let args = json!({});
    assert!(client("http://127.0.0.1:9", FailMode::Open).is_allowed(&sample_query(&args)));
}

// ============================================================================
// SECTION: Wire Shape
// ============================================================================

#[test]
fn decision_request_wraps_fields_under_input() {
    let (url, handle) = spawn_capturing_pdp(r#"{"result": true}"#);
    let args = json!({"email": "a@b.com"});
    assert!(client(&url, FailMode::Closed).is_allowed(&sample_query(&args)));

    let captured = handle.join().unwrap();
    assert_eq!(captured["input"]["tool"], json!("getCustomerByEmail"));
    assert_eq!(captured["input"]["tenant"], json!("acme"));
    assert_eq!(captured["input"]["args"], args);
}

#[test]
fn absent_identity_serializes_as_null() {
    let (url, handle) = spawn_capturing_pdp(r#"{"result": true}"#);
    let args = json!({});
    let query = PolicyQuery {
        principal: None,
        tenant: None,
        tool: "exportOrders",
        args: &args,
    };
    assert!(client(&url, FailMode::Closed).is_allowed(&query));

    let captured = handle.join().unwrap();
    assert_eq!(captured["input"]["principal"], Value::Null);
    assert_eq!(captured["input"]["tenant"], Value::Null);
}
