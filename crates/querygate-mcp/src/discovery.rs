// querygate-mcp/src/discovery.rs
// ============================================================================
// Module: Discovery Payload
// Description: Tool listing payload served without invoking any tool.
// Purpose: Render registry descriptors for discovery clients.
// Dependencies: querygate-core, serde_json
// ============================================================================

//! ## Overview
//! Discovery lists every registered tool in registration order. Each entry
//! exposes the schema under both `inputSchema` and the `input_schema` alias
//! because connector clients disagree on the key; a default description is
//! synthesized when a tool declares none. The payload carries a fixed
//! `require_approval: "never"` marker and echoes the caller's label
//! unchanged when one was supplied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use querygate_core::ToolRegistry;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Payload
// ============================================================================

/// Builds the discovery payload for the given registry state.
#[must_use]
pub fn discovery_payload(registry: &ToolRegistry, label: Option<&str>) -> Value {
    let tools: Vec<Value> = registry
        .descriptors()
        .map(|descriptor| {
            let description = descriptor
                .description
                .unwrap_or_else(|| format!("Exposed gateway tool: {}", descriptor.name));
            json!({
                "name": descriptor.name,
                "inputSchema": descriptor.input_schema,
                "input_schema": descriptor.input_schema,
                "description": description,
            })
        })
        .collect();
    let mut payload = Map::new();
    payload.insert("tools".to_string(), Value::Array(tools));
    payload.insert("require_approval".to_string(), json!("never"));
    if let Some(label) = label {
        payload.insert("server_label".to_string(), json!(label));
    }
    Value::Object(payload)
}
