// querygate-core/src/registry.rs
// ============================================================================
// Module: Tool Registry
// Description: Insertion-ordered, read-mostly registry of gateway tools.
// Purpose: Provide deterministic discovery listings and exact-name lookup.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The registry maps tool names to tool instances. Registration happens once
//! during process initialization; afterwards the registry is frozen behind an
//! `Arc` and only read. Discovery listings iterate in registration order so
//! repeated calls against the same registry state are byte-identical.
//!
//! ## Invariants
//! - Lookup is case-sensitive and exact; fuzzy resolution is a normalizer
//!   concern, not a registry concern.
//! - Re-registering a name replaces the instance but keeps its original
//!   position in the listing order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::tool::Tool;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Immutable description of a registered tool for discovery listings.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// JSON Schema document for the tool's input object.
    pub input_schema: Value,
    /// Declared human-readable description, if any.
    pub description: Option<String>,
}

/// Insertion-ordered registry of gateway tools.
#[derive(Default)]
pub struct ToolRegistry {
    /// Tools in registration order.
    tools: Vec<Arc<dyn Tool>>,
    /// Name to position index for exact lookup.
    index: BTreeMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its declared name.
    ///
    /// Last-registered-wins: a duplicate name replaces the prior instance in
    /// place, preserving the original listing position.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if let Some(&position) = self.index.get(&name) {
            self.tools[position] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Looks up a tool by exact, case-sensitive name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&position| Arc::clone(&self.tools[position]))
    }

    /// Returns the first tool in registration order, if any.
    #[must_use]
    pub fn first(&self) -> Option<Arc<dyn Tool>> {
        self.tools.first().map(Arc::clone)
    }

    /// Returns a lazy, restartable iterator over descriptors in
    /// registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = ToolDescriptor> + '_ {
        self.tools.iter().map(|tool| ToolDescriptor {
            name: tool.name().to_string(),
            input_schema: tool.input_schema(),
            description: tool.description().map(str::to_string),
        })
    }

    /// Returns tool names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tools.iter().map(|tool| tool.name())
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true when no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
