// querygate-mcp/src/normalize.rs
// ============================================================================
// Module: Request Normalizer
// Description: Reduction of heterogeneous client envelopes to canonical form.
// Purpose: Absorb envelope dialect variance before dispatch.
// Dependencies: querygate-core, serde_json, uuid
// ============================================================================

//! ## Overview
//! Client integrations against the gateway are heterogeneous and loosely
//! protocol-compliant. The normalizer accepts four recognized envelope shapes —
//! JSON-RPC, simple, connector probe, and connector invocation — and reduces
//! each to a canonical [`ToolInvocation`] or a discovery request, so the
//! dispatcher and registry only ever see one shape.
//!
//! ## Resolution order for connector tool names
//! Exact match, then case-insensitive match, then match after stripping all
//! non-alphanumeric characters and lower-casing both sides, then the first
//! registered tool. The final fallback is a permissive default kept for
//! connector probe/validation flows; it applies only when at least one tool
//! is registered.
//!
//! ## Header extraction
//! Each semantic context field follows one ordered rule list regardless of
//! envelope shape: explicit body header, then transport header, then absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use querygate_core::InvocationContext;
use querygate_core::ToolInvocation;
use querygate_core::ToolRegistry;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Transport-level header values carried into normalization.
#[derive(Debug, Clone, Default)]
pub struct TransportHeaders {
    /// Authorization header value when present.
    pub authorization: Option<String>,
    /// Tenant header value when present.
    pub tenant: Option<String>,
}

/// Canonical request produced by normalization.
#[derive(Debug)]
pub enum NormalizedRequest {
    /// Discovery request; `id` is present for the JSON-RPC `initialize`
    /// method and absent for connector probes.
    Discovery {
        /// JSON-RPC request identifier when the envelope carried one.
        id: Option<String>,
        /// Caller-supplied label to echo back, if any.
        label: Option<String>,
    },
    /// Canonical tool invocation.
    Invoke {
        /// Request identifier for the response envelope.
        id: String,
        /// Resolved invocation.
        invocation: ToolInvocation,
    },
}

/// Terminal normalization failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// JSON-RPC envelope named an unsupported method.
    #[error("Method not found: {method}")]
    UnknownMethod {
        /// Request identifier for the error envelope.
        id: String,
        /// Method name as received.
        method: String,
    },
    /// JSON-RPC envelope with missing or unusable parameters.
    #[error("{message}")]
    InvalidParams {
        /// Request identifier for the error envelope.
        id: String,
        /// Failure description.
        message: String,
    },
    /// Non-JSON-RPC envelope that cannot be normalized; rendered in the
    /// plain `{"error": message}` fallback shape.
    #[error("{message}")]
    BadRequest {
        /// Failure description.
        message: String,
    },
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes one client envelope against the current registry state.
///
/// # Errors
///
/// Returns [`NormalizeError`] for terminal bad-request failures; fuzzy tool
/// name resolution is attempted before any failure is raised.
pub fn normalize(
    body: &Value,
    transport: &TransportHeaders,
    registry: &ToolRegistry,
) -> Result<NormalizedRequest, NormalizeError> {
    if body.get("jsonrpc").is_some() && body.get("method").is_some() {
        return normalize_json_rpc(body, transport);
    }
    if let Some(tools) = body.get("tools").and_then(Value::as_array)
        && !tools.is_empty()
    {
        let first = &tools[0];
        if body.get("input").is_none() {
            return Ok(NormalizedRequest::Discovery {
                id: None,
                label: connector_label(first),
            });
        }
        return normalize_connector(body, first, transport, registry);
    }
    normalize_simple(body, transport)
}

/// Normalizes the JSON-RPC envelope shape.
fn normalize_json_rpc(
    body: &Value,
    transport: &TransportHeaders,
) -> Result<NormalizedRequest, NormalizeError> {
    let id = request_id(body.get("id"));
    let method = body.get("method").and_then(Value::as_str).unwrap_or_default();
    match method {
        "initialize" => Ok(NormalizedRequest::Discovery {
            id: Some(id),
            label: None,
        }),
        "tools/execute" => {
            let Some(params) = body.get("params").filter(|params| !params.is_null()) else {
                return Err(NormalizeError::InvalidParams {
                    id,
                    message: "Missing params".to_string(),
                });
            };
            let Some(name) = non_blank_string(params.get("name")) else {
                return Err(NormalizeError::InvalidParams {
                    id,
                    message: "Missing 'name'".to_string(),
                });
            };
            let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
            let context = extract_context(params.get("headers"), transport);
            Ok(NormalizedRequest::Invoke {
                id,
                invocation: ToolInvocation {
                    tool_name: name,
                    arguments,
                    context,
                },
            })
        }
        other => Err(NormalizeError::UnknownMethod {
            id,
            method: other.to_string(),
        }),
    }
}

/// Normalizes the connector invocation shape (`tools` array plus `input`).
fn normalize_connector(
    body: &Value,
    first: &Value,
    transport: &TransportHeaders,
    registry: &ToolRegistry,
) -> Result<NormalizedRequest, NormalizeError> {
    let Some(candidate) = connector_label(first) else {
        return Err(NormalizeError::BadRequest {
            message: "Missing 'name' in tools[0]".to_string(),
        });
    };
    let Some(tool_name) = resolve_tool_name(&candidate, registry) else {
        return Err(NormalizeError::BadRequest {
            message: "Missing 'name' in tools[0]".to_string(),
        });
    };

    let arguments = if let Some(args) = first.get("arguments") {
        args.clone()
    } else if let Some(args) = body.get("arguments") {
        args.clone()
    } else {
        // `input` is present by shape detection.
        let input = body.get("input").cloned().unwrap_or(Value::Null);
        if input.is_object() {
            input
        } else {
            json!({"input": stringify(&input)})
        }
    };

    let context = extract_context(first.get("headers"), transport);
    Ok(NormalizedRequest::Invoke {
        id: generated_id(),
        invocation: ToolInvocation {
            tool_name,
            arguments,
            context,
        },
    })
}

/// Normalizes the simple shape (top-level `name` plus optional `arguments`).
fn normalize_simple(
    body: &Value,
    transport: &TransportHeaders,
) -> Result<NormalizedRequest, NormalizeError> {
    let Some(name) = non_blank_string(body.get("name")) else {
        return Err(NormalizeError::BadRequest {
            message: "Missing 'name'".to_string(),
        });
    };
    let arguments = body.get("arguments").cloned().unwrap_or_else(|| json!({}));
    let context = extract_context(body.get("headers"), transport);
    Ok(NormalizedRequest::Invoke {
        id: generated_id(),
        invocation: ToolInvocation {
            tool_name: name,
            arguments,
            context,
        },
    })
}

// ============================================================================
// SECTION: Tool Name Resolution
// ============================================================================

/// Resolves a connector-supplied candidate against the registry.
///
/// Returns `None` only when the registry is empty.
fn resolve_tool_name(candidate: &str, registry: &ToolRegistry) -> Option<String> {
    if registry.lookup(candidate).is_some() {
        return Some(candidate.to_string());
    }
    if let Some(name) = registry.names().find(|name| name.eq_ignore_ascii_case(candidate)) {
        return Some(name.to_string());
    }
    let normalized = alphanumeric_lower(candidate);
    if let Some(name) = registry.names().find(|name| alphanumeric_lower(name) == normalized) {
        return Some(name.to_string());
    }
    registry.first().map(|tool| tool.name().to_string())
}

/// Lower-cases and strips all non-alphanumeric characters.
fn alphanumeric_lower(value: &str) -> String {
    value.chars().filter(char::is_ascii_alphanumeric).collect::<String>().to_ascii_lowercase()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the candidate label from a connector tool entry
/// (`server_label`, else `name`).
fn connector_label(first: &Value) -> Option<String> {
    non_blank_string(first.get("server_label")).or_else(|| non_blank_string(first.get("name")))
}

/// Returns the value as a non-blank string, if it is one.
fn non_blank_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).filter(|text| !text.trim().is_empty()).map(str::to_string)
}

/// Coerces the JSON-RPC `id` member to a string, generating a fresh token
/// when it is absent or blank.
fn request_id(id: Option<&Value>) -> String {
    match id {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => generated_id(),
    }
}

/// Generates a fresh opaque request identifier.
pub(crate) fn generated_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds the invocation context from the ordered extraction rules.
fn extract_context(body_headers: Option<&Value>, transport: &TransportHeaders) -> InvocationContext {
    InvocationContext::new(
        extract_field(body_headers, "authorization", transport.authorization.as_deref()),
        extract_field(body_headers, "x-tenant", transport.tenant.as_deref()),
    )
}

/// Applies the extraction rules for one semantic field: explicit body
/// header, then transport header, then absent.
fn extract_field(
    body_headers: Option<&Value>,
    key: &str,
    transport_value: Option<&str>,
) -> Option<String> {
    if let Some(headers) = body_headers.and_then(Value::as_object)
        && let Some(value) = headers.get(key).and_then(Value::as_str)
    {
        return Some(value.to_string());
    }
    transport_value.map(str::to_string)
}

/// Renders a non-string `input` value as its string form for the synthesized
/// single-field argument object.
fn stringify(input: &Value) -> String {
    match input {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
