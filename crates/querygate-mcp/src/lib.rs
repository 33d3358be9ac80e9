// querygate-mcp/src/lib.rs
// ============================================================================
// Module: Query Gate MCP
// Description: Request normalization, dispatch, and transports for Query Gate.
// Purpose: Expose gateway tools over a JSON-RPC 2.0 envelope with authz.
// Dependencies: querygate-core, querygate-policy, axum, tokio
// ============================================================================

//! ## Overview
//! This crate is the gateway's request pipeline: heterogeneous client
//! envelopes are normalized to a canonical tool invocation, dispatched
//! through the authorization gate, executed against the matched tool, and
//! rendered under the JSON-RPC 2.0 response contract. Both transports
//! (line-oriented stdio and HTTP) call the same dispatcher.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod discovery;
pub mod dispatch;
pub mod normalize;
pub mod rpc;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditRecord;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::HttpRequestEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use dispatch::CallError;
pub use dispatch::Dispatcher;
pub use dispatch::GatewayResponse;
pub use normalize::NormalizeError;
pub use normalize::NormalizedRequest;
pub use normalize::TransportHeaders;
pub use rpc::JsonRpcError;
pub use rpc::JsonRpcResponse;
pub use server::McpServer;
pub use server::McpServerError;
