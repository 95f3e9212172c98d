//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, configuration files, or defaults.
//! Tool availability is a pure function of this configuration: sections left
//! unconfigured simply keep their tools out of the registry.

use super::transport::HttpConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Authentication configuration.
    pub auth: AuthConfig,

    /// Blockchain collaborator configuration.
    pub chain: ChainConfig,

    /// Vector search collaborator configuration.
    pub search: SearchConfig,

    /// Model provider configuration (image generation).
    pub model: ModelConfig,

    /// Authoring agent configuration.
    pub agent: AgentConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP transport configuration.
    pub transport: HttpConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Authentication configuration.
///
/// When `required` is false the server runs in public mode: the global gate
/// is skipped and only tools that individually require a JWT force a
/// credential check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Deployment-wide authorization switch.
    pub required: bool,

    /// Base64-encoded Ed25519 public key used to verify JWT signatures.
    pub verifying_key: Option<String>,
}

/// Configuration for the blockchain collaborator.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint for read operations.
    pub rpc_url: Option<String>,

    /// Relayer endpoint that accepts signed transfer orders.
    pub relayer_url: Option<String>,

    /// Relayer API key authorizing transfer submission.
    pub relayer_key: Option<String>,
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("relayer_url", &self.relayer_url)
            .field("relayer_key", &self.relayer_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Configuration for the vector search collaborator.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    /// Vector search query endpoint.
    pub endpoint: Option<String>,

    /// API key sent with search requests.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Configuration for the model provider.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ModelConfig {
    /// Selected model provider (e.g. "openai").
    pub provider: Option<String>,

    /// Whether image generation is enabled for the selected provider.
    pub image_generation: bool,

    /// API key for the image endpoint.
    pub image_api_key: Option<String>,

    /// Image generation endpoint.
    pub image_endpoint: Option<String>,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("image_generation", &self.image_generation)
            .field("image_api_key", &self.image_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("image_endpoint", &self.image_endpoint)
            .finish()
    }
}

/// Configuration for the authoring agent.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AgentConfig {
    /// Whether the authoring agent tool is registered.
    pub enabled: bool,

    /// MCP endpoint the agent calls back into (usually this server).
    pub endpoint: Option<String>,

    /// Service JWT the agent uses for its callback tool calls.
    pub jwt: Option<String>,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("jwt", &self.jwt.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "dapp-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            auth: AuthConfig::default(),
            chain: ChainConfig::default(),
            search: SearchConfig::default(),
            model: ModelConfig::default(),
            agent: AgentConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: HttpConfig::default(),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | ""))
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_AUTH_REQUIRED`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(required) = env_flag("MCP_AUTH_REQUIRED") {
            config.auth.required = required;
        }
        if let Ok(key) = std::env::var("MCP_AUTH_VERIFYING_KEY") {
            config.auth.verifying_key = Some(key);
        }
        if config.auth.required && config.auth.verifying_key.is_none() {
            warn!(
                "MCP_AUTH_REQUIRED is set without MCP_AUTH_VERIFYING_KEY; \
                 every authenticated request will be rejected"
            );
        }

        if let Ok(url) = std::env::var("MCP_CHAIN_RPC_URL") {
            config.chain.rpc_url = Some(url);
        }
        if let Ok(url) = std::env::var("MCP_CHAIN_RELAYER_URL") {
            config.chain.relayer_url = Some(url);
        }
        if let Ok(key) = std::env::var("MCP_CHAIN_RELAYER_KEY") {
            config.chain.relayer_key = Some(key);
            info!("Relayer key loaded from environment");
        }

        if let Ok(endpoint) = std::env::var("MCP_SEARCH_ENDPOINT") {
            config.search.endpoint = Some(endpoint);
        }
        if let Ok(key) = std::env::var("MCP_SEARCH_API_KEY") {
            config.search.api_key = Some(key);
        }

        if let Ok(provider) = std::env::var("MCP_MODEL_PROVIDER") {
            config.model.provider = Some(provider.to_lowercase());
        }
        if let Some(enabled) = env_flag("MCP_IMAGE_GENERATION") {
            config.model.image_generation = enabled;
        }
        if let Ok(key) = std::env::var("MCP_IMAGE_API_KEY") {
            config.model.image_api_key = Some(key);
        }
        if let Ok(endpoint) = std::env::var("MCP_IMAGE_ENDPOINT") {
            config.model.image_endpoint = Some(endpoint);
        }

        if let Some(enabled) = env_flag("MCP_AGENT_ENABLED") {
            config.agent.enabled = enabled;
        }
        if let Ok(endpoint) = std::env::var("MCP_AGENT_ENDPOINT") {
            config.agent.endpoint = Some(endpoint);
        }
        if let Ok(jwt) = std::env::var("MCP_AGENT_JWT") {
            config.agent.jwt = Some(jwt);
        }

        config.transport = HttpConfig::from_env();

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_auth_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_AUTH_REQUIRED", "true");
            std::env::set_var("MCP_AUTH_VERIFYING_KEY", "c29tZS1rZXk=");
        }
        let config = Config::from_env();
        assert!(config.auth.required);
        assert_eq!(config.auth.verifying_key.as_deref(), Some("c29tZS1rZXk="));
        unsafe {
            std::env::remove_var("MCP_AUTH_REQUIRED");
            std::env::remove_var("MCP_AUTH_VERIFYING_KEY");
        }
    }

    #[test]
    fn test_auth_defaults_to_public() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("MCP_AUTH_REQUIRED");
        }
        let config = Config::from_env();
        assert!(!config.auth.required);
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let config = Config {
            chain: ChainConfig {
                rpc_url: Some("https://rpc.example".to_string()),
                relayer_url: None,
                relayer_key: Some("super_secret_key".to_string()),
            },
            search: SearchConfig {
                endpoint: None,
                api_key: Some("search_secret".to_string()),
            },
            model: ModelConfig {
                image_api_key: Some("image_secret".to_string()),
                ..ModelConfig::default()
            },
            agent: AgentConfig {
                jwt: Some("agent_secret".to_string()),
                ..AgentConfig::default()
            },
            ..Config::default()
        };
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
        assert!(!debug_str.contains("search_secret"));
        assert!(!debug_str.contains("image_secret"));
        assert!(!debug_str.contains("agent_secret"));
    }

    #[test]
    fn test_env_flag_parsing() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_IMAGE_GENERATION", "0");
        }
        let config = Config::from_env();
        assert!(!config.model.image_generation);
        unsafe {
            std::env::set_var("MCP_IMAGE_GENERATION", "true");
        }
        let config = Config::from_env();
        assert!(config.model.image_generation);
        unsafe {
            std::env::remove_var("MCP_IMAGE_GENERATION");
        }
    }
}
