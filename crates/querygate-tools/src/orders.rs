// querygate-tools/src/orders.rs
// ============================================================================
// Module: Order Export Tool
// Description: Bounded date-range order export tool.
// Purpose: Expose the orders table through the gateway with a hard row cap.
// Dependencies: querygate-core, querygate-store-sqlite
// ============================================================================

//! ## Overview
//! `exportOrders` exports orders created in the half-open range `[from, to)`.
//! The effective row limit is `min(requested, max_rows)` with a default of
//! `min(1000, max_rows)`; the response carries a `truncated` flag when the
//! cap was reached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use querygate_core::ExecutionError;
use querygate_core::InvocationContext;
use querygate_core::Tool;
use querygate_store_sqlite::SqliteQueryStore;
use querygate_store_sqlite::StoreError;
use serde_json::Value;
use serde_json::json;

use crate::schemas;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default row limit when the caller does not request one.
pub const DEFAULT_EXPORT_LIMIT: u32 = 1_000;

// ============================================================================
// SECTION: Tool
// ============================================================================

/// Bounded order export over a date range.
pub struct ExportOrdersTool {
    /// Query store executing the export.
    store: Arc<SqliteQueryStore>,
    /// Hard row cap from configuration.
    max_rows: u32,
}

impl ExportOrdersTool {
    /// Creates the tool over a shared query store with the configured cap.
    #[must_use]
    pub fn new(store: Arc<SqliteQueryStore>, max_rows: u32) -> Self {
        Self {
            store,
            max_rows,
        }
    }
}

impl Tool for ExportOrdersTool {
    fn name(&self) -> &str {
        "exportOrders"
    }

    fn description(&self) -> Option<&str> {
        Some("Export orders created in a half-open date range, capped by row limit")
    }

    fn input_schema(&self) -> Value {
        schemas::export_orders()
    }

    fn execute(&self, _ctx: &InvocationContext, args: &Value) -> Result<Value, ExecutionError> {
        let from = require_date(args, "from")?;
        let to = require_date(args, "to")?;
        let limit = effective_limit(args.get("limit"), self.max_rows)?;
        let export = self.store.export_orders(from, to, limit).map_err(|err| match err {
            StoreError::InvalidDate(value) => {
                ExecutionError::InvalidArgument(format!("invalid date: {value}"))
            }
            other => ExecutionError::Backend(other.to_string()),
        })?;
        Ok(json!({"rows": export.rows, "truncated": export.truncated}))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts a required string date argument.
fn require_date<'a>(args: &'a Value, field: &str) -> Result<&'a str, ExecutionError> {
    args.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ExecutionError::InvalidArgument(format!("missing '{field}'")))
}

/// Computes the effective row limit: `min(requested, max_rows)`, defaulting
/// to `min(DEFAULT_EXPORT_LIMIT, max_rows)`.
fn effective_limit(requested: Option<&Value>, max_rows: u32) -> Result<u32, ExecutionError> {
    let requested = match requested {
        None | Some(Value::Null) => return Ok(DEFAULT_EXPORT_LIMIT.min(max_rows)),
        Some(value) => value
            .as_u64()
            .ok_or_else(|| ExecutionError::InvalidArgument("'limit' must be a positive integer".to_string()))?,
    };
    let requested = u32::try_from(requested).unwrap_or(u32::MAX);
    Ok(requested.min(max_rows))
}
