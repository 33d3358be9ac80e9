// querygate-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Query Store
// Description: SQLite-backed query executor for Query Gate tools.
// Purpose: Provide bounded, read-only business queries over a SQLite file.
// Dependencies: rusqlite, serde_json, time
// ============================================================================

//! ## Overview
//! This crate provides the query executor behind the gateway's database
//! tools. Queries are parameterized, row-capped, and synchronous; each tool
//! call performs at most one bounded round-trip. The store never creates or
//! mutates business tables — it reads the `customers` and `orders` tables of
//! an existing database file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::OrdersExport;
pub use store::SqliteQueryStore;
pub use store::SqliteStoreConfig;
pub use store::StoreError;
