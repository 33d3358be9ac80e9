// querygate-store-sqlite/src/store/tests.rs
// ============================================================================
// Module: SQLite Query Store Unit Tests
// Description: Unit tests for bounded customer and order queries.
// Purpose: Validate row caps, range semantics, and date validation.
// Dependencies: querygate-store-sqlite, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Exercises the query store against a seeded temporary database: lookup
//! hits and misses, half-open export ranges, the row cap and truncation
//! flag, and date validation failures.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use serde_json::json;
use tempfile::TempDir;

use super::SqliteQueryStore;
use super::SqliteStoreConfig;
use super::StoreError;

/// Creates a seeded business database and returns its path.
fn seeded_database(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("business.db");
    let connection = Connection::open(&path).expect("create db");
    connection
        .execute_batch(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, email TEXT NOT NULL, name TEXT NOT \
             NULL);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, \
             created_at TEXT NOT NULL, total_cents INTEGER NOT NULL);
             INSERT INTO customers (id, email, name) VALUES (1, 'a@b.com', 'Ada');
             INSERT INTO customers (id, email, name) VALUES (2, 'c@d.com', 'Grace');
             INSERT INTO orders (id, customer_id, created_at, total_cents) VALUES
                 (1, 1, '2024-01-10T09:00:00Z', 1500),
                 (2, 1, '2024-01-15T10:30:00Z', 2500),
                 (3, 2, '2024-01-31T23:59:59Z', 900),
                 (4, 2, '2024-02-01T00:00:00Z', 4200);",
        )
        .expect("seed db");
    path
}

/// Opens a store over the given database file.
fn open_store(path: &Path) -> SqliteQueryStore {
    SqliteQueryStore::open(&SqliteStoreConfig {
        path: path.to_path_buf(),
        busy_timeout_ms: 1_000,
    })
    .expect("open store")
}

#[test]
fn customer_lookup_returns_row() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&seeded_database(&dir));
    let customer = store.get_customer_by_email("a@b.com").expect("lookup");
    assert_eq!(customer, json!({"id": 1, "email": "a@b.com", "name": "Ada"}));
}

#[test]
fn customer_miss_returns_empty_object() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&seeded_database(&dir));
    let customer = store.get_customer_by_email("nobody@example.com").expect("lookup");
    assert_eq!(customer, json!({}));
}

#[test]
fn export_range_is_half_open() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&seeded_database(&dir));
    let export = store.export_orders("2024-01-01", "2024-02-01", 100).expect("export");
    // The 2024-02-01 order is excluded by the exclusive upper bound.
    assert_eq!(export.rows.len(), 3);
    assert!(!export.truncated);
    assert_eq!(export.rows[0]["id"], json!(1));
    assert_eq!(export.rows[2]["id"], json!(3));
}

#[test]
fn export_orders_sorted_by_created_at() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&seeded_database(&dir));
    let export = store.export_orders("2024-01-01", "2024-03-01", 100).expect("export");
    let stamps: Vec<&str> =
        export.rows.iter().map(|row| row["created_at"].as_str().unwrap()).collect();
    let mut sorted = stamps.clone();
    sorted.sort_unstable();
    assert_eq!(stamps, sorted);
}

#[test]
fn export_reports_truncation_at_cap() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&seeded_database(&dir));
    let export = store.export_orders("2024-01-01", "2024-03-01", 2).expect("export");
    assert_eq!(export.rows.len(), 2);
    assert!(export.truncated);
}

#[test]
fn export_rejects_malformed_dates() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&seeded_database(&dir));
    let err = store.export_orders("01/01/2024", "2024-02-01", 10).expect_err("bad from");
    assert!(matches!(err, StoreError::InvalidDate(_)));
    let err = store.export_orders("2024-01-01", "2024-13-40", 10).expect_err("bad to");
    assert!(matches!(err, StoreError::InvalidDate(_)));
}

#[test]
fn open_missing_database_fails() {
    let dir = TempDir::new().expect("temp dir");
    let result = SqliteQueryStore::open(&SqliteStoreConfig {
        path: dir.path().join("absent.db"),
        busy_timeout_ms: 1_000,
    });
    assert!(result.is_err());
}
