//! MCP Server Entry Point
//!
//! Initializes logging, loads configuration from the environment, builds
//! the tool registry and auth resolver, and serves MCP over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use dapp_mcp_server::core::transport::{AppState, HttpTransport};
use dapp_mcp_server::core::{AuthResolver, Config, Dispatcher};
use dapp_mcp_server::domains::tools::build_registry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment (and .env if present)
    let config = Config::from_env();

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);

    let registry = Arc::new(build_registry(&config).context("building tool registry")?);
    info!("Registered {} tool(s): {:?}", registry.len(), registry.names());

    let resolver = Arc::new(
        AuthResolver::from_config(&config.auth).context("building auth resolver")?,
    );
    if config.auth.required {
        info!("Authorization: required for all requests");
    } else {
        info!("Authorization: public mode, enforced per tool");
    }

    let dispatcher = Arc::new(Dispatcher::new(registry.clone(), resolver.clone()));

    let state = AppState {
        dispatcher,
        registry,
        resolver,
        server_name: config.server.name.clone(),
        server_version: config.server.version.clone(),
        rpc_path: config.transport.rpc_path.clone(),
    };

    let transport = HttpTransport::new(config.transport);
    transport.run(state).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
