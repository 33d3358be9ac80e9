// querygate-tools/src/schemas.rs
// ============================================================================
// Module: Tool Input Schemas
// Description: JSON Schema documents for the gateway tools.
// Purpose: Declare discoverable input contracts for each tool.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Schemas are descriptive documents served through discovery; the dispatcher
//! does not pre-validate arguments against them. Bad argument values surface
//! as tool execution failures.

use serde_json::Value;
use serde_json::json;

/// Schema for the customer-by-email lookup input.
#[must_use]
pub fn email_lookup() -> Value {
    json!({
        "type": "object",
        "properties": {
            "email": {"type": "string", "format": "email"}
        },
        "required": ["email"]
    })
}

/// Schema for the order export input.
#[must_use]
pub fn export_orders() -> Value {
    json!({
        "type": "object",
        "properties": {
            "from": {"type": "string", "format": "date"},
            "to": {"type": "string", "format": "date"},
            "limit": {"type": "integer", "maximum": 10000, "default": 1000}
        },
        "required": ["from", "to"]
    })
}
