// querygate-mcp/src/server.rs
// ============================================================================
// Module: Gateway Server
// Description: Stdio and HTTP transports for the Query Gate dispatcher.
// Purpose: Serve discovery and invocation under the JSON-RPC 2.0 contract.
// Dependencies: querygate-config, querygate-tools, axum, tokio
// ============================================================================

//! ## Overview
//! Both transports call the same dispatcher. The stdio transport reads one
//! JSON-RPC request object per input line and writes exactly one response
//! object per output line. The HTTP transport serves discovery on `GET /mcp`
//! and `GET /mcp/{label}` and accepts all four envelope shapes on
//! `POST /mcp`, forcing the JSON content type regardless of the client's
//! `Accept` header.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::routing::get;
use querygate_config::AuditSinkKind;
use querygate_config::QuerygateConfig;
use querygate_config::ServerTransport;
use querygate_core::ToolRegistry;
use querygate_policy::AllowAllGate;
use querygate_policy::PdpClient;
use querygate_policy::PolicyGate;
use querygate_store_sqlite::SqliteQueryStore;
use querygate_store_sqlite::SqliteStoreConfig;
use querygate_tools::ExportOrdersTool;
use querygate_tools::GetCustomerByEmailTool;
use serde_json::Value;
use serde_json::json;

use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::HttpRequestEvent;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::dispatch::Dispatcher;
use crate::dispatch::GatewayResponse;
use crate::normalize::TransportHeaders;
use crate::normalize::generated_id;
use crate::rpc::CODE_FORBIDDEN;
use crate::rpc::CODE_INVALID_PARAMS;
use crate::rpc::CODE_INVALID_REQUEST;
use crate::rpc::JsonRpcResponse;

// ============================================================================
// SECTION: Gateway Server
// ============================================================================

/// Gateway server instance.
pub struct McpServer {
    /// Server configuration.
    config: QuerygateConfig,
    /// Dispatcher shared by the transports.
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Builds a gateway server from configuration.
    ///
    /// Registration happens here, once, in a fixed order; the registry is
    /// frozen before the first request is served.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when initialization fails.
    pub fn from_config(config: QuerygateConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;

        let store = Arc::new(
            SqliteQueryStore::open(&SqliteStoreConfig {
                path: config.database.path.clone(),
                busy_timeout_ms: config.database.busy_timeout_ms,
            })
            .map_err(|err| McpServerError::Init(err.to_string()))?,
        );

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(GetCustomerByEmailTool::new(Arc::clone(&store))));
        registry.register(Arc::new(ExportOrdersTool::new(store, config.database.max_rows)));

        let policy: Arc<dyn PolicyGate> = if config.policy.require_auth {
            Arc::new(
                PdpClient::from_config(&config.policy)
                    .map_err(|err| McpServerError::Init(err.to_string()))?,
            )
        } else {
            Arc::new(AllowAllGate)
        };

        let audit = build_audit_sink(&config)?;
        let dispatcher = Dispatcher::new(
            Arc::new(registry),
            policy,
            audit,
            config.server.server_label.clone(),
        );
        Ok(Self {
            config,
            dispatcher,
        })
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        let max_body_bytes = self.config.server.max_body_bytes;
        match self.config.server.transport {
            ServerTransport::Stdio => serve_stdio(&self.dispatcher, max_body_bytes),
            ServerTransport::Http => serve_http(self.config, self.dispatcher).await,
        }
    }
}

/// Builds the audit sink from configuration.
fn build_audit_sink(config: &QuerygateConfig) -> Result<Arc<dyn AuditSink>, McpServerError> {
    let sink: Arc<dyn AuditSink> = match config.audit.sink {
        AuditSinkKind::Stderr => Arc::new(StderrAuditSink),
        AuditSinkKind::File => {
            let path = config
                .audit
                .path
                .as_ref()
                .ok_or_else(|| McpServerError::Config("audit.path required".to_string()))?;
            Arc::new(
                FileAuditSink::new(path).map_err(|err| McpServerError::Init(err.to_string()))?,
            )
        }
        AuditSinkKind::None => Arc::new(NoopAuditSink),
    };
    Ok(sink)
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves line-oriented JSON-RPC over stdin/stdout, one request per line.
fn serve_stdio(dispatcher: &Dispatcher, max_body_bytes: usize) -> Result<(), McpServerError> {
    let stdin = std::io::stdin();
    let mut writer = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = line.map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        let response = stdio_response(dispatcher, &line, max_body_bytes);
        let payload = serde_json::to_string(&response)
            .map_err(|_| McpServerError::Transport("json-rpc serialization failed".to_string()))?;
        writeln!(writer, "{payload}")
            .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
        writer.flush().map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    }
    Ok(())
}

/// Produces exactly one JSON-RPC response for one input line.
fn stdio_response(dispatcher: &Dispatcher, line: &str, max_body_bytes: usize) -> JsonRpcResponse {
    if line.len() > max_body_bytes {
        return JsonRpcResponse::err(
            generated_id(),
            CODE_INVALID_REQUEST,
            "request body too large".to_string(),
        );
    }
    let Ok(body) = serde_json::from_str::<Value>(line) else {
        return JsonRpcResponse::err(
            generated_id(),
            CODE_INVALID_REQUEST,
            "invalid json-rpc request".to_string(),
        );
    };
    match dispatcher.handle(&body, &TransportHeaders::default()) {
        GatewayResponse::Rpc(response) => response,
        // Non-JSON-RPC failures still render as one response line here.
        GatewayResponse::Plain {
            message,
        } => JsonRpcResponse::err(generated_id(), CODE_INVALID_PARAMS, message),
        GatewayResponse::Discovery(payload) => JsonRpcResponse::ok(generated_id(), payload),
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Shared server state for HTTP handlers.
struct ServerState {
    /// Dispatcher for request handling.
    dispatcher: Dispatcher,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

/// Serves discovery and invocation over HTTP.
async fn serve_http(config: QuerygateConfig, dispatcher: Dispatcher) -> Result<(), McpServerError> {
    let bind = config
        .server
        .bind
        .as_ref()
        .ok_or_else(|| McpServerError::Config("bind address required".to_string()))?;
    let addr: SocketAddr =
        bind.parse().map_err(|_| McpServerError::Config("invalid bind address".to_string()))?;
    let state = Arc::new(ServerState {
        dispatcher,
        max_body_bytes: config.server.max_body_bytes,
    });
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("http bind failed".to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|_| McpServerError::Transport("http server failed".to_string()))
}

/// Builds the HTTP router over shared state.
fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/mcp", get(handle_discovery_root).post(handle_invoke))
        .route("/mcp/{label}", get(handle_discovery_label))
        .with_state(state)
}

/// Handles unlabeled discovery requests.
async fn handle_discovery_root(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    log_http_request(&state, "GET", "/mcp", &headers);
    axum::Json(state.dispatcher.discovery(None))
}

/// Handles labeled discovery requests.
async fn handle_discovery_label(
    State(state): State<Arc<ServerState>>,
    Path(label): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    log_http_request(&state, "GET", &format!("/mcp/{label}"), &headers);
    axum::Json(state.dispatcher.discovery(Some(&label)))
}

/// Handles invocation requests in any recognized envelope shape.
async fn handle_invoke(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> impl IntoResponse {
    log_http_request(&state, "POST", "/mcp", &headers);
    if bytes.len() > state.max_body_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            axum::Json(json!({"error": "request body too large"})),
        );
    }
    let Ok(body) = serde_json::from_slice::<Value>(bytes.as_ref()) else {
        return (StatusCode::BAD_REQUEST, axum::Json(json!({"error": "invalid json"})));
    };
    let transport = transport_headers(&headers);
    let response = handle_with_blocking(&state.dispatcher, &body, &transport);
    render_http(response)
}

/// Runs the dispatcher, shifting to a blocking context when available.
///
/// The policy round-trip and the tool's database query both block; under
/// the multi-thread runtime the call is isolated with `block_in_place`.
fn handle_with_blocking(
    dispatcher: &Dispatcher,
    body: &Value,
    transport: &TransportHeaders,
) -> GatewayResponse {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| dispatcher.handle(body, transport))
        }
        _ => dispatcher.handle(body, transport),
    }
}

/// Renders a gateway response as an HTTP status and JSON body.
fn render_http(response: GatewayResponse) -> (StatusCode, axum::Json<Value>) {
    match response {
        GatewayResponse::Rpc(rpc) => {
            let status = rpc_status(&rpc);
            match serde_json::to_value(&rpc) {
                Ok(value) => (status, axum::Json(value)),
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({"error": "serialization failed"})),
                ),
            }
        }
        GatewayResponse::Plain {
            message,
        } => (StatusCode::BAD_REQUEST, axum::Json(json!({"error": message}))),
        GatewayResponse::Discovery(payload) => (StatusCode::OK, axum::Json(payload)),
    }
}

/// Maps a JSON-RPC response to its HTTP status.
fn rpc_status(response: &JsonRpcResponse) -> StatusCode {
    match response.error_code() {
        None => StatusCode::OK,
        Some(CODE_FORBIDDEN) => StatusCode::FORBIDDEN,
        Some(_) => StatusCode::BAD_REQUEST,
    }
}

/// Extracts the transport-level identity headers.
fn transport_headers(headers: &HeaderMap) -> TransportHeaders {
    TransportHeaders {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        tenant: headers.get("x-tenant").and_then(|value| value.to_str().ok()).map(str::to_string),
    }
}

/// Emits one request log event; sink failures are discarded.
fn log_http_request(state: &ServerState, method: &str, path: &str, headers: &HeaderMap) {
    let accept =
        headers.get("accept").and_then(|value| value.to_str().ok()).map(str::to_string);
    let event = HttpRequestEvent::new(method.to_string(), path.to_string(), accept);
    state.dispatcher.audit().record_http(&event);
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests;
