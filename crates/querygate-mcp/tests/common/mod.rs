// querygate-mcp/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared fixtures for gateway integration tests.
// Purpose: Provide a seeded database, stub PDP, and dispatcher builders.
// Dependencies: querygate-mcp, querygate-store-sqlite, rusqlite, tiny_http
// ============================================================================

//! ## Overview
//! This module provides a seeded business database, a single-request stub
//! policy decision point, and dispatcher builders used across the gateway
//! integration tests.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use querygate_config::FailMode;
use querygate_config::PolicyConfig;
use querygate_core::ToolRegistry;
use querygate_mcp::AuditRecord;
use querygate_mcp::AuditSink;
use querygate_mcp::Dispatcher;
use querygate_policy::PdpClient;
use querygate_policy::PolicyGate;
use querygate_store_sqlite::SqliteQueryStore;
use querygate_store_sqlite::SqliteStoreConfig;
use querygate_tools::ExportOrdersTool;
use querygate_tools::GetCustomerByEmailTool;
use rusqlite::Connection;
use tempfile::TempDir;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Audit sink collecting records in memory.
#[derive(Default)]
pub struct RecordingSink {
    /// Collected invocation records.
    pub records: Mutex<Vec<AuditRecord>>,
}

impl AuditSink for RecordingSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

impl RecordingSink {
    /// Returns the number of collected records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or_default()
    }
}

/// Creates a seeded business database under the given directory.
pub fn seeded_database(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("business.db");
    let connection = Connection::open(&path).expect("create db");
    connection
        .execute_batch(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, email TEXT NOT NULL, name TEXT NOT \
             NULL);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, \
             created_at TEXT NOT NULL, total_cents INTEGER NOT NULL);
             INSERT INTO customers (id, email, name) VALUES (1, 'a@b.com', 'Ada');
             INSERT INTO orders (id, customer_id, created_at, total_cents) VALUES
                 (1, 1, '2024-01-10T09:00:00Z', 1500),
                 (2, 1, '2024-01-15T10:30:00Z', 2500);",
        )
        .expect("seed db");
    path
}

/// Builds the gateway registry over a seeded store.
pub fn seeded_registry(dir: &TempDir) -> ToolRegistry {
    let store = Arc::new(
        SqliteQueryStore::open(&SqliteStoreConfig {
            path: seeded_database(dir),
            busy_timeout_ms: 1_000,
        })
        .expect("open store"),
    );
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GetCustomerByEmailTool::new(Arc::clone(&store))));
    registry.register(Arc::new(ExportOrdersTool::new(store, 10_000)));
    registry
}

/// Builds a dispatcher over a seeded registry with the given gate and sink.
pub fn seeded_dispatcher(
    dir: &TempDir,
    gate: Arc<dyn PolicyGate>,
    sink: Arc<RecordingSink>,
) -> Dispatcher {
    Dispatcher::new(Arc::new(seeded_registry(dir)), gate, sink, None)
}

// ============================================================================
// SECTION: Stub PDP
// ============================================================================

/// Spawns a stub PDP answering one decision request with the given body.
pub fn spawn_pdp(body: &'static str) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("bind stub pdp");
    let addr = server.server_addr().to_ip().expect("stub pdp addr");
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string(body).with_status_code(200);
            let _ = request.respond(response);
        }
    });

    (url, handle)
}

/// Builds a PDP-backed gate against the given stub URL.
pub fn pdp_gate(base_url: &str) -> Arc<dyn PolicyGate> {
    Arc::new(
        PdpClient::from_config(&PolicyConfig {
            base_url: Some(base_url.to_string()),
            decision_path: "/v1/data/querygate/allow".to_string(),
            timeout_ms: 2_000,
            fail_mode: FailMode::Closed,
            require_auth: true,
        })
        .expect("build pdp client"),
    )
}
