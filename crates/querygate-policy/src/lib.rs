// querygate-policy/src/lib.rs
// ============================================================================
// Module: Query Gate Policy
// Description: Authorization gate backed by an external policy decision point.
// Purpose: Gate tool execution on a per-call allow/deny decision.
// Dependencies: querygate-config, reqwest, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The authorization gate consults an external policy decision point (PDP)
//! with a normalized decision request before any tool executes. The PDP call
//! is a blocking, bounded-timeout round-trip on the request path. Transport
//! failures resolve per the configured fail posture — an explicit, named
//! configuration value, never an implicit catch-all.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::AllowAllGate;
pub use client::PdpClient;
pub use client::PolicyError;
pub use client::PolicyGate;
pub use client::PolicyQuery;
