// querygate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Query Store
// Description: Bounded business queries over a shared SQLite connection.
// Purpose: Execute the customer and order queries behind gateway tools.
// Dependencies: rusqlite, serde_json, time, thiserror
// ============================================================================

//! ## Overview
//! One shared connection guarded by a mutex serves all tool calls. Date
//! range parameters are validated as `YYYY-MM-DD` before reaching SQL, and
//! the order export range is half-open (`created_at >= from AND
//! created_at < to`) over ISO-8601 text timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::Date;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum total path length accepted for the database file.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the `SQLite` query store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Query store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store path is unusable.
    #[error("query store path error: {0}")]
    Path(String),
    /// `SQLite` engine error.
    #[error("query store db error: {0}")]
    Db(String),
    /// A date parameter failed `YYYY-MM-DD` validation.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of a bounded order export.
#[derive(Debug, Clone)]
pub struct OrdersExport {
    /// Exported rows in `created_at` ascending order.
    pub rows: Vec<Value>,
    /// True when the export hit the row cap.
    pub truncated: bool,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed query executor for gateway tools.
pub struct SqliteQueryStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Mutex<Connection>,
}

impl SqliteQueryStore {
    /// Opens the query store over an existing database file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the database cannot be opened.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, StoreError> {
        validate_store_path(&config.path)?;
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(&config.path, flags)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        apply_pragmas(&connection, config)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Looks up one customer by exact email.
    ///
    /// Returns an empty JSON object when no row matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    pub fn get_customer_by_email(&self, email: &str) -> Result<Value, StoreError> {
        let guard =
            self.connection.lock().map_err(|_| StoreError::Db("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                "SELECT id, email, name FROM customers WHERE email = ?1 LIMIT 1",
                params![email],
                |row| {
                    let id: i64 = row.get(0)?;
                    let email: String = row.get(1)?;
                    let name: String = row.get(2)?;
                    Ok(json!({"id": id, "email": email, "name": name}))
                },
            )
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(row.unwrap_or_else(|| json!({})))
    }

    /// Exports orders created in the half-open range `[from, to)`.
    ///
    /// Both bounds must be `YYYY-MM-DD`; `limit` is the caller-computed
    /// effective row cap.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a bound is invalid or the query fails.
    pub fn export_orders(
        &self,
        from: &str,
        to: &str,
        limit: u32,
    ) -> Result<OrdersExport, StoreError> {
        validate_date(from)?;
        validate_date(to)?;
        let guard =
            self.connection.lock().map_err(|_| StoreError::Db("mutex poisoned".to_string()))?;
        let mut statement = guard
            .prepare(
                "SELECT id, customer_id, created_at, total_cents FROM orders WHERE created_at >= \
                 ?1 AND created_at < ?2 ORDER BY created_at ASC LIMIT ?3",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let mapped = statement
            .query_map(params![from, to, i64::from(limit)], |row| {
                let id: i64 = row.get(0)?;
                let customer_id: i64 = row.get(1)?;
                let created_at: String = row.get(2)?;
                let total_cents: i64 = row.get(3)?;
                Ok(json!({
                    "id": id,
                    "customer_id": customer_id,
                    "created_at": created_at,
                    "total_cents": total_cents,
                }))
            })
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row.map_err(|err| StoreError::Db(err.to_string()))?);
        }
        let truncated = rows.len() >= limit as usize;
        Ok(OrdersExport {
            rows,
            truncated,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the database path against length limits.
fn validate_store_path(path: &Path) -> Result<(), StoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() || path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(StoreError::Path("database path exceeds length limit".to_string()));
    }
    if path.exists() && path.is_dir() {
        return Err(StoreError::Path("database path must be a file, not a directory".to_string()));
    }
    Ok(())
}

/// Applies connection pragmas for shared read access.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), StoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| StoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| StoreError::Db(err.to_string()))?;
    Ok(())
}

/// Validates a `YYYY-MM-DD` date bound.
fn validate_date(value: &str) -> Result<(), StoreError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).map_err(|_| StoreError::InvalidDate(value.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests;
