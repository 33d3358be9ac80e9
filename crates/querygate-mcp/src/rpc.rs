// querygate-mcp/src/rpc.rs
// ============================================================================
// Module: JSON-RPC Envelope
// Description: JSON-RPC 2.0 response envelope and error codes.
// Purpose: Enforce the result/error mutual-exclusivity contract on the wire.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Responses carry exactly one of `result` or `error`; the absent member is
//! never serialized. Error codes are distinct per failure kind so callers can
//! tell protocol errors, unknown tools, policy denials, and tool failures
//! apart without parsing messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Error Codes
// ============================================================================

/// Invalid or missing request parameters.
pub const CODE_INVALID_PARAMS: i64 = -32602;
/// Unknown JSON-RPC method.
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
/// Tool name did not resolve to a registered tool.
pub const CODE_UNKNOWN_TOOL: i64 = -32001;
/// Policy decision point denied the call.
pub const CODE_FORBIDDEN: i64 = 403;
/// Tool execution or other internal failure.
pub const CODE_INTERNAL: i64 = -32000;
/// Request envelope was not a usable JSON-RPC document.
pub const CODE_INVALID_REQUEST: i64 = -32600;

// ============================================================================
// SECTION: Types
// ============================================================================

/// JSON-RPC error payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    pub jsonrpc: &'static str,
    /// Request identifier.
    pub id: String,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    #[must_use]
    pub fn ok(id: String, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response.
    #[must_use]
    pub fn err(id: String, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
            }),
        }
    }

    /// Returns the error code when the response is a failure.
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref().map(|error| error.code)
    }
}
