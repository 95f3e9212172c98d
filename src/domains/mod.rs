//! Domain modules organized by bounded context.
//!
//! Currently the only domain is `tools`; the MCP surface of this server is
//! tool discovery and invocation.

pub mod tools;
