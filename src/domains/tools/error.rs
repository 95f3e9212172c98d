//! Tool-specific error types.
//!
//! Handlers abort deliberately by returning one of these variants; the
//! dispatcher renders them as a `CallResult` with `isError: true`, never as
//! a transport-level error.

use thiserror::Error;

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool requires a verified identity that was not injected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A downstream collaborator (RPC node, relayer, search, model) failed.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "unauthorized" error.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a new "upstream" error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
