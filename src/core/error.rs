//! Error types and handling for the MCP server.
//!
//! Most layers carry their own error enum (`ToolError`, `AuthError`,
//! `TransportError`, `ClientError`) and keep it at their boundary; the
//! unified type covers the failures that cut across layers: configuration
//! problems at startup and serialization of outbound replies.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors, fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization errors on the response path.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
