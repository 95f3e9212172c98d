//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients to
//! perform specific actions or computations.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `registry.rs` - Central tool registry and conditional construction
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a new tool
//!
//! 1. Create a new file in `definitions/` with params, consts, and handler
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `registry.rs::build_registry` behind its config gate

pub mod definitions;
mod error;
mod registry;

pub use error::ToolError;
pub use registry::{ToolDefinition, ToolHandler, ToolRegistry, build_registry};
