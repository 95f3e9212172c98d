//! Vector search query tool definition.
//!
//! Queries the configured vector index. The index itself (embedding model,
//! ranking) is an opaque collaborator behind one HTTP endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::core::protocol::{CallResult, JsonObject, ToolManifest};
use crate::domains::tools::definitions::parse_args;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::{ToolDefinition, ToolHandler};

/// Default number of hits returned.
fn default_top_k() -> usize {
    5
}

/// Clamp the requested hit count to the allowed range (1-50).
fn clamp_top_k(top_k: usize) -> usize {
    top_k.clamp(1, 50)
}

/// Parameters for the search query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchQueryParams {
    /// Natural-language query.
    #[schemars(description = "Natural-language search query")]
    pub query: String,

    /// Maximum number of hits to return (default: 5, max: 50).
    #[schemars(description = "Maximum number of hits (default: 5, max: 50)")]
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Search query tool - retrieves nearest matches from the vector index.
pub struct SearchQueryTool {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SearchQueryTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "search_query";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Search the vector index for content matching a natural-language query. Returns ranked hits with scores.";

    /// Build the registrable definition. Search is public.
    pub fn definition(
        http: reqwest::Client,
        endpoint: String,
        api_key: Option<String>,
    ) -> ToolDefinition {
        ToolDefinition {
            manifest: ToolManifest {
                name: Self::NAME.to_string(),
                description: Some(Self::DESCRIPTION.to_string()),
                input_schema: schemars::schema_for!(SearchQueryParams).to_value(),
            },
            requires_jwt: false,
            handler: Arc::new(Self {
                http,
                endpoint,
                api_key,
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for SearchQueryTool {
    #[instrument(name = "search_query", skip_all)]
    async fn call(&self, args: JsonObject) -> Result<CallResult, ToolError> {
        let params: SearchQueryParams = parse_args(args)?;
        if params.query.trim().is_empty() {
            return Ok(CallResult::error("Search failed: empty query"));
        }
        let top_k = clamp_top_k(params.top_k);
        info!(query = %params.query, top_k, "search query");

        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": params.query, "top_k": top_k }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ToolError::upstream(format!("search request failed: {e}")))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Ok(CallResult::error(format!(
                "Search failed: index returned {status}"
            )));
        }

        Ok(CallResult::json(json!({
            "query": params.query,
            "hits": body,
        })))
    }
}
