//! Tool Registry - central registration and lookup for all tools.
//!
//! The registry is built once at startup from configuration and treated as
//! read-only afterwards. Each tool is registered only when its external
//! prerequisites are met; tools whose prerequisites are unmet are simply
//! absent, so callers see "Tool not found" rather than a distinct
//! "tool disabled" state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::client::{ClientConfig, McpClient};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::protocol::{CallResult, JsonObject, ToolManifest};

use super::definitions::{
    AgentComposeTool, ChainBalanceTool, ChainTransferTool, ImageGenerateTool, SearchQueryTool,
};
use super::error::ToolError;

/// Trait implemented by every tool handler.
///
/// Handlers signal domain failures by returning `Ok` with an error-flagged
/// [`CallResult`]; a returned [`ToolError`] is a deliberate abort that the
/// dispatcher renders generically.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with the given arguments.
    async fn call(&self, args: JsonObject) -> std::result::Result<CallResult, ToolError>;
}

/// Server-internal definition of one tool.
///
/// Wraps the wire-visible manifest with the handler and the authorization
/// requirement. `requires_jwt` never crosses the wire.
pub struct ToolDefinition {
    /// Wire-visible description.
    pub manifest: ToolManifest,

    /// Whether calls must carry a verified JWT.
    pub requires_jwt: bool,

    /// The handler invoked by the dispatcher.
    pub handler: Arc<dyn ToolHandler>,
}

/// Tool registry - owns the authoritative set of tool definitions.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool definition.
    ///
    /// A duplicate name is a fatal configuration error at startup, not a
    /// runtime condition.
    pub fn register(&mut self, def: ToolDefinition) -> Result<()> {
        let name = def.manifest.name.clone();
        if self.index.contains_key(&name) {
            return Err(Error::config(format!("duplicate tool name: {name}")));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(def);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Manifests of all registered tools, in registration order.
    pub fn list(&self) -> Vec<ToolManifest> {
        self.tools.iter().map(|t| t.manifest.clone()).collect()
    }

    /// Names of all registered tools, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.manifest.name.as_str()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Build the registry from configuration.
///
/// Prerequisites are evaluated once here, never per request. Registration
/// order is fixed so that `tools/list` output is deterministic across runs
/// with identical configuration.
pub fn build_registry(config: &Config) -> Result<ToolRegistry> {
    let http = reqwest::Client::new();
    let mut registry = ToolRegistry::new();

    if let Some(rpc_url) = &config.chain.rpc_url {
        registry.register(ChainBalanceTool::definition(http.clone(), rpc_url.clone()))?;

        if let (Some(relayer_url), Some(relayer_key)) =
            (&config.chain.relayer_url, &config.chain.relayer_key)
        {
            registry.register(ChainTransferTool::definition(
                http.clone(),
                relayer_url.clone(),
                relayer_key.clone(),
            ))?;
        }
    }

    if let Some(endpoint) = &config.search.endpoint {
        registry.register(SearchQueryTool::definition(
            http.clone(),
            endpoint.clone(),
            config.search.api_key.clone(),
        ))?;
    }

    if config.model.provider.as_deref() == Some("openai") && config.model.image_generation {
        registry.register(ImageGenerateTool::definition(
            http.clone(),
            config.model.image_endpoint.clone(),
            config.model.image_api_key.clone(),
        ))?;
    }

    if config.agent.enabled {
        let endpoint = config
            .agent
            .endpoint
            .clone()
            .unwrap_or_else(|| config.transport.local_url());
        let client = McpClient::new(ClientConfig {
            endpoint,
            jwt: config.agent.jwt.clone(),
            requires_jwt: config.agent.jwt.is_some(),
            timeout: ClientConfig::default_timeout(),
        });
        registry.register(AgentComposeTool::definition(client))?;
    }

    info!(tools = ?registry.names(), "tool registry built");
    Ok(registry)
}
