// querygate-core/src/lib.rs
// ============================================================================
// Module: Query Gate Core
// Description: Core tool abstractions for the Query Gate protocol gateway.
// Purpose: Define the tool capability trait, registry, and invocation types.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Query Gate exposes parameterized backend operations ("tools") to external
//! agents. This crate defines the tool capability trait, the in-memory tool
//! registry, and the canonical invocation types shared by every transport.
//! The registry is built once at startup and frozen behind an `Arc` before
//! serving; all request-path access is read-only.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod registry;
pub mod tool;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use registry::ToolDescriptor;
pub use registry::ToolRegistry;
pub use tool::ExecutionError;
pub use tool::InvocationContext;
pub use tool::Tool;
pub use tool::ToolInvocation;
