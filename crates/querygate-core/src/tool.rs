// querygate-core/src/tool.rs
// ============================================================================
// Module: Tool Capability Trait
// Description: Capability trait and invocation types for gateway tools.
// Purpose: Define the closed capability set every gateway tool implements.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! A tool is a named, schema-described backend operation. The capability set
//! is deliberately closed: `name`, `input_schema`, and `execute`. Concrete
//! tools own their backend dependency (a query store handle); they never see
//! the registry or the transport.
//!
//! ## Invariants
//! - Tool names are unique and immutable once registered.
//! - `execute` runs synchronously on the request path with no implicit retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Invocation Context
// ============================================================================

/// Caller identity derived per request from header-like fields.
///
/// Ephemeral: scoped to one invocation, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    /// Caller principal (authorization header value) when provided.
    pub principal: Option<String>,
    /// Tenant identifier when provided.
    pub tenant: Option<String>,
}

impl InvocationContext {
    /// Builds a context from optional principal and tenant values.
    #[must_use]
    pub fn new(principal: Option<String>, tenant: Option<String>) -> Self {
        Self {
            principal,
            tenant,
        }
    }
}

/// Canonical, shape-independent representation of one tool call.
///
/// Produced by request normalization and consumed immediately by the
/// dispatcher.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Candidate tool name after resolution.
    pub tool_name: String,
    /// JSON arguments for the tool.
    pub arguments: Value,
    /// Caller identity for authorization and audit.
    pub context: InvocationContext,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures raised by a tool's own logic during execution.
///
/// These surface to callers as an internal-class protocol error carrying the
/// failure description, never a backtrace.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A required argument is missing or has an unusable value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The tool's backend (query store) failed.
    #[error("backend error: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Capability trait for gateway tools.
///
/// Implementations are registered once at startup and shared immutably
/// across in-flight requests.
pub trait Tool: Send + Sync {
    /// Unique tool name, stable for the process lifetime.
    fn name(&self) -> &str;

    /// Optional human-readable description for discovery listings.
    ///
    /// Discovery synthesizes a default when this returns `None`.
    fn description(&self) -> Option<&str> {
        None
    }

    /// JSON Schema document describing the tool's input object.
    fn input_schema(&self) -> Value;

    /// Executes the tool with the given caller context and arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when arguments are unusable or the backend
    /// fails.
    fn execute(&self, ctx: &InvocationContext, args: &Value) -> Result<Value, ExecutionError>;
}
