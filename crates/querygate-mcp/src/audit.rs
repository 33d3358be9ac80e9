// querygate-mcp/src/audit.rs
// ============================================================================
// Module: Gateway Audit Logging
// Description: Structured audit events for tool invocation attempts.
// Purpose: Emit JSON-line audit records without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! One audit record is emitted per attempted execution after authorization
//! has passed — for successes and for tool failures alike, never for denials
//! or pre-authorization failures. Recording is best-effort: sink failures
//! are discarded and never reach the response path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit record for one attempted tool execution.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Caller principal when provided.
    pub principal: Option<String>,
    /// Tenant identifier when provided.
    pub tenant: Option<String>,
    /// Resolved tool name.
    pub tool: String,
    /// Tool arguments as received.
    pub arguments: Value,
    /// Outcome classification, never the payload itself.
    pub result_summary: String,
}

/// Inputs required to construct an audit record.
pub struct AuditRecordParams {
    /// Caller principal when provided.
    pub principal: Option<String>,
    /// Tenant identifier when provided.
    pub tenant: Option<String>,
    /// Resolved tool name.
    pub tool: String,
    /// Tool arguments as received.
    pub arguments: Value,
    /// Outcome classification.
    pub result_summary: String,
}

impl AuditRecord {
    /// Creates a new audit record with a consistent timestamp.
    #[must_use]
    pub fn new(params: AuditRecordParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "tool_invocation",
            timestamp_ms,
            principal: params.principal,
            tenant: params.tenant,
            tool: params.tool,
            arguments: params.arguments,
            result_summary: params.result_summary,
        }
    }
}

/// Request log event for the HTTP transport.
#[derive(Debug, Clone, Serialize)]
pub struct HttpRequestEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Accept header when provided.
    pub accept: Option<String>,
}

impl HttpRequestEvent {
    /// Creates a new request event with a consistent timestamp.
    #[must_use]
    pub fn new(method: String, path: String, accept: Option<String>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "http_request",
            timestamp_ms,
            method,
            path,
            accept,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for gateway events.
pub trait AuditSink: Send + Sync {
    /// Record an invocation audit record.
    fn record(&self, record: &AuditRecord);

    /// Record an HTTP request event.
    fn record_http(&self, _event: &HttpRequestEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(payload) = serde_json::to_string(record) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_http(&self, event: &HttpRequestEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to an append-only file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(payload) = serde_json::to_string(record)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }

    fn record_http(&self, event: &HttpRequestEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _record: &AuditRecord) {}

    fn record_http(&self, _event: &HttpRequestEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Classifies a successful tool result for the audit trail.
#[must_use]
pub fn summarize_result(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array[{}]", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}
