// querygate-mcp/src/dispatch.rs
// ============================================================================
// Module: Protocol Dispatcher
// Description: Authorization-gated dispatch of canonical tool invocations.
// Purpose: Orchestrate normalize, lookup, authorize, execute, audit, respond.
// Dependencies: querygate-core, querygate-policy, serde_json
// ============================================================================

//! ## Overview
//! The dispatcher drives one request through a terminal state machine:
//! received, normalized, resolved or not found, authorized or denied,
//! executed or failed, audited, responded. Authorization is always evaluated
//! strictly before execution; no tool executes on a denied decision. Every
//! attempted execution — success or tool failure — is audited best-effort.
//! All failures are caught here and rendered as well-formed responses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use querygate_core::ToolInvocation;
use querygate_core::ToolRegistry;
use querygate_policy::PolicyGate;
use querygate_policy::PolicyQuery;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::audit::AuditRecord;
use crate::audit::AuditRecordParams;
use crate::audit::AuditSink;
use crate::audit::summarize_result;
use crate::discovery::discovery_payload;
use crate::normalize::NormalizeError;
use crate::normalize::NormalizedRequest;
use crate::normalize::TransportHeaders;
use crate::normalize::normalize;
use crate::rpc::CODE_FORBIDDEN;
use crate::rpc::CODE_INTERNAL;
use crate::rpc::CODE_INVALID_PARAMS;
use crate::rpc::CODE_METHOD_NOT_FOUND;
use crate::rpc::CODE_UNKNOWN_TOOL;
use crate::rpc::JsonRpcResponse;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures of one dispatched call, each with a distinct error code.
#[derive(Debug, Error)]
pub enum CallError {
    /// Missing or unusable parameters; never reaches authorization.
    #[error("{0}")]
    InvalidParams(String),
    /// Unsupported JSON-RPC method.
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    /// Tool name did not resolve after normalization.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// Policy decision point denied the call.
    #[error("Forbidden by policy")]
    Forbidden,
    /// The tool's own logic failed; the message is the failure description.
    #[error("{0}")]
    Internal(String),
}

impl CallError {
    /// Returns the JSON-RPC error code for this failure kind.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::InvalidParams(_) => CODE_INVALID_PARAMS,
            Self::MethodNotFound(_) => CODE_METHOD_NOT_FOUND,
            Self::UnknownTool(_) => CODE_UNKNOWN_TOOL,
            Self::Forbidden => CODE_FORBIDDEN,
            Self::Internal(_) => CODE_INTERNAL,
        }
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Transport-agnostic response produced by the dispatcher.
#[derive(Debug)]
pub enum GatewayResponse {
    /// JSON-RPC response envelope.
    Rpc(JsonRpcResponse),
    /// Plain `{"error": message}` fallback for non-JSON-RPC failures.
    Plain {
        /// Failure description.
        message: String,
    },
    /// Raw discovery payload for connector probes.
    Discovery(Value),
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Protocol dispatcher over a frozen tool registry.
pub struct Dispatcher {
    /// Frozen tool registry shared across in-flight requests.
    registry: Arc<ToolRegistry>,
    /// Per-call authorization gate.
    policy: Arc<dyn PolicyGate>,
    /// Audit sink for attempted executions.
    audit: Arc<dyn AuditSink>,
    /// Configured label echoed into unlabeled discovery payloads.
    server_label: Option<String>,
}

impl Dispatcher {
    /// Creates a dispatcher over its collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<ToolRegistry>,
        policy: Arc<dyn PolicyGate>,
        audit: Arc<dyn AuditSink>,
        server_label: Option<String>,
    ) -> Self {
        Self {
            registry,
            policy,
            audit,
            server_label,
        }
    }

    /// Returns the audit sink shared with the transports.
    #[must_use]
    pub fn audit(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    /// Builds the discovery payload, preferring the caller's label over the
    /// configured one.
    #[must_use]
    pub fn discovery(&self, label: Option<&str>) -> Value {
        discovery_payload(&self.registry, label.or(self.server_label.as_deref()))
    }

    /// Handles one raw envelope and renders a transport-agnostic response.
    #[must_use]
    pub fn handle(&self, body: &Value, transport: &TransportHeaders) -> GatewayResponse {
        match normalize(body, transport, &self.registry) {
            Ok(NormalizedRequest::Discovery {
                id: Some(id),
                label,
            }) => GatewayResponse::Rpc(JsonRpcResponse::ok(id, self.discovery(label.as_deref()))),
            Ok(NormalizedRequest::Discovery {
                id: None,
                label,
            }) => GatewayResponse::Discovery(self.discovery(label.as_deref())),
            Ok(NormalizedRequest::Invoke {
                id,
                invocation,
            }) => match self.execute(&invocation) {
                Ok(output) => GatewayResponse::Rpc(JsonRpcResponse::ok(id, output)),
                Err(error) => {
                    GatewayResponse::Rpc(JsonRpcResponse::err(id, error.code(), error.to_string()))
                }
            },
            Err(NormalizeError::UnknownMethod {
                id,
                method,
            }) => {
                let error = CallError::MethodNotFound(method);
                GatewayResponse::Rpc(JsonRpcResponse::err(id, error.code(), error.to_string()))
            }
            Err(NormalizeError::InvalidParams {
                id,
                message,
            }) => {
                let error = CallError::InvalidParams(message);
                GatewayResponse::Rpc(JsonRpcResponse::err(id, error.code(), error.to_string()))
            }
            Err(NormalizeError::BadRequest {
                message,
            }) => GatewayResponse::Plain {
                message,
            },
        }
    }

    /// Executes a canonical invocation through the gated pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CallError`] for each distinct failure kind; tool failures
    /// are still audited as attempted executions.
    pub fn execute(&self, invocation: &ToolInvocation) -> Result<Value, CallError> {
        if invocation.tool_name.trim().is_empty() {
            return Err(CallError::InvalidParams("Missing 'name'".to_string()));
        }
        let Some(tool) = self.registry.lookup(&invocation.tool_name) else {
            return Err(CallError::UnknownTool(invocation.tool_name.clone()));
        };

        let query = PolicyQuery {
            principal: invocation.context.principal.as_deref(),
            tenant: invocation.context.tenant.as_deref(),
            tool: &invocation.tool_name,
            args: &invocation.arguments,
        };
        if !self.policy.is_allowed(&query) {
            return Err(CallError::Forbidden);
        }

        match tool.execute(&invocation.context, &invocation.arguments) {
            Ok(result) => {
                self.record_attempt(invocation, summarize_result(&result));
                Ok(json!({"output": result}))
            }
            Err(error) => {
                self.record_attempt(invocation, format!("error: {error}"));
                Err(CallError::Internal(error.to_string()))
            }
        }
    }

    /// Records one attempted execution; sink failures are discarded.
    fn record_attempt(&self, invocation: &ToolInvocation, result_summary: String) {
        let record = AuditRecord::new(AuditRecordParams {
            principal: invocation.context.principal.clone(),
            tenant: invocation.context.tenant.clone(),
            tool: invocation.tool_name.clone(),
            arguments: invocation.arguments.clone(),
            result_summary,
        });
        self.audit.record(&record);
    }
}
