// querygate-tools/src/lib.rs
// ============================================================================
// Module: Query Gate Tools
// Description: Concrete database tools exposed through the gateway.
// Purpose: Implement the customer lookup and order export tools.
// Dependencies: querygate-core, querygate-store-sqlite, serde_json
// ============================================================================

//! ## Overview
//! Each tool implements the [`querygate_core::Tool`] capability trait over a
//! shared [`querygate_store_sqlite::SqliteQueryStore`] handle. Tools own
//! their backend dependency; they never see the registry or the transport.
//! Input schemas are declared as plain JSON Schema documents.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod customer;
pub mod orders;
pub mod schemas;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use customer::GetCustomerByEmailTool;
pub use orders::DEFAULT_EXPORT_LIMIT;
pub use orders::ExportOrdersTool;
