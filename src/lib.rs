//! MCP tool-calling server for a dApp backend.
//!
//! This crate exposes a small Model Context Protocol (MCP) surface over
//! HTTP: `tools/list` for discovery and `tools/call` for invocation, with
//! per-tool JWT authorization.
//!
//! # Architecture
//!
//! - **core**: Wire contract, configuration, auth, dispatch and the HTTP
//!   transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: the tool registry and the individual tool definitions
//! - **client**: An MCP client for calling this server (or a peer) from
//!   other processes, also used by the composition tool
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dapp_mcp_server::core::{AuthResolver, Config, Dispatcher};
//! use dapp_mcp_server::domains::tools::build_registry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let registry = Arc::new(build_registry(&config)?);
//!     let resolver = Arc::new(AuthResolver::from_config(&config.auth)?);
//!     let dispatcher = Dispatcher::new(registry, resolver);
//!     // Hand the dispatcher to a transport...
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use client::{ClientConfig, ClientError, McpClient};
pub use core::{AuthResolver, Config, Dispatcher, Error, Result};
