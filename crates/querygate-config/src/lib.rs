// querygate-config/src/lib.rs
// ============================================================================
// Module: Query Gate Configuration
// Description: Configuration loading and validation for Query Gate.
// Purpose: Provide strict, fail-closed config parsing with named limits.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! This crate loads the Query Gate configuration from a TOML file with strict
//! size and range limits. Missing or invalid configuration fails closed so a
//! misconfigured gateway never serves with surprising defaults.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuditConfig;
pub use config::AuditSinkKind;
pub use config::ConfigError;
pub use config::DatabaseConfig;
pub use config::FailMode;
pub use config::PolicyConfig;
pub use config::QuerygateConfig;
pub use config::ServerConfig;
pub use config::ServerTransport;
