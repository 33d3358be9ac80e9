// querygate-tools/src/customer.rs
// ============================================================================
// Module: Customer Lookup Tool
// Description: Exact-email customer lookup tool.
// Purpose: Expose the customers table through the gateway.
// Dependencies: querygate-core, querygate-store-sqlite
// ============================================================================

//! ## Overview
//! `getCustomerByEmail` resolves one customer record by exact email. A miss
//! is a successful call returning an empty object, not an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use querygate_core::ExecutionError;
use querygate_core::InvocationContext;
use querygate_core::Tool;
use querygate_store_sqlite::SqliteQueryStore;
use serde_json::Value;

use crate::schemas;

// ============================================================================
// SECTION: Tool
// ============================================================================

/// Customer lookup by exact email.
pub struct GetCustomerByEmailTool {
    /// Query store executing the lookup.
    store: Arc<SqliteQueryStore>,
}

impl GetCustomerByEmailTool {
    /// Creates the tool over a shared query store.
    #[must_use]
    pub fn new(store: Arc<SqliteQueryStore>) -> Self {
        Self {
            store,
        }
    }
}

impl Tool for GetCustomerByEmailTool {
    fn name(&self) -> &str {
        "getCustomerByEmail"
    }

    fn description(&self) -> Option<&str> {
        Some("Look up a single customer record by exact email address")
    }

    fn input_schema(&self) -> Value {
        schemas::email_lookup()
    }

    fn execute(&self, _ctx: &InvocationContext, args: &Value) -> Result<Value, ExecutionError> {
        let email = args
            .get("email")
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ExecutionError::InvalidArgument("missing 'email'".to_string()))?;
        self.store
            .get_customer_by_email(email)
            .map_err(|err| ExecutionError::Backend(err.to_string()))
    }
}
