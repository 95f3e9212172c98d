//! Transport layer for the MCP server.
//!
//! One transport is supported: JSON over HTTP POST, served by axum. The
//! transport owns the HTTP-level auth decisions (global gate and per-tool
//! precheck) and hands everything else to the [`Dispatcher`].
//!
//! [`Dispatcher`]: crate::core::dispatch::Dispatcher

mod config;
mod error;
mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use http::{AppState, HttpTransport, build_router};
