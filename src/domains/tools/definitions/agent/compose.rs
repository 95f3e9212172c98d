//! Authoring agent tool definition.
//!
//! Runs a multi-phase authoring flow by composing other tools through the
//! MCP client: discover what is registered, gather context via search,
//! illustrate via image generation, then assemble a draft. Optional phases
//! degrade gracefully when their tool is absent or fails; only the assembly
//! itself is mandatory.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::client::McpClient;
use crate::core::protocol::{CallResult, ContentItem, JsonObject, ToolManifest};
use crate::domains::tools::definitions::parse_args;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::{ToolDefinition, ToolHandler};

/// Parameters for the authoring agent tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AgentComposeParams {
    /// Topic to author a draft about.
    #[schemars(description = "Topic to author a draft about")]
    pub topic: String,

    /// Optional style hint carried into the draft.
    #[schemars(description = "Optional style hint, e.g. 'technical' or 'casual'")]
    #[serde(default)]
    pub style: Option<String>,
}

/// Authoring agent tool - composes other tools into one draft.
pub struct AgentComposeTool {
    client: McpClient,
}

impl AgentComposeTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "agent_compose";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Run the multi-phase authoring agent: research the topic, generate an illustration, and assemble a draft.";

    /// Build the registrable definition. The agent acts on behalf of a
    /// caller, so it is gated on a verified identity.
    pub fn definition(client: McpClient) -> ToolDefinition {
        ToolDefinition {
            manifest: ToolManifest {
                name: Self::NAME.to_string(),
                description: Some(Self::DESCRIPTION.to_string()),
                input_schema: schemars::schema_for!(AgentComposeParams).to_value(),
            },
            requires_jwt: true,
            handler: Arc::new(Self { client }),
        }
    }

    /// Run one optional phase: call `tool` when it is registered, returning
    /// its JSON payload on success and None on any failure.
    async fn optional_phase(
        &self,
        available: &[ToolManifest],
        tool: &str,
        args: JsonObject,
    ) -> Option<Value> {
        if !available.iter().any(|m| m.name == tool) {
            info!(tool, "phase skipped: tool not registered");
            return None;
        }
        match self.client.call_tool(tool, Some(args)).await {
            Ok(result) if !result.is_error() => Some(result_payload(&result)),
            Ok(result) => {
                warn!(tool, ?result, "phase skipped: tool reported an error");
                None
            }
            Err(err) => {
                warn!(tool, error = %err, "phase skipped: call failed");
                None
            }
        }
    }
}

/// Flatten a call result into one JSON value for draft assembly.
fn result_payload(result: &CallResult) -> Value {
    let items: Vec<Value> = result
        .content
        .iter()
        .map(|item| match item {
            ContentItem::Text { text } => json!(text),
            ContentItem::Json { data } => data.clone(),
        })
        .collect();
    match items.len() {
        1 => items.into_iter().next().unwrap_or(Value::Null),
        _ => Value::Array(items),
    }
}

fn args_of(value: Value) -> JsonObject {
    value.as_object().cloned().unwrap_or_default()
}

#[async_trait]
impl ToolHandler for AgentComposeTool {
    #[instrument(name = "agent_compose", skip_all)]
    async fn call(&self, args: JsonObject) -> Result<CallResult, ToolError> {
        let params: AgentComposeParams = parse_args(args)?;
        if params.topic.trim().is_empty() {
            return Ok(CallResult::error("Authoring failed: empty topic"));
        }
        info!(topic = %params.topic, "authoring agent started");

        // Phase 1: discovery. list_tools degrades to empty on failure, which
        // simply turns the optional phases off.
        let available = self.client.list_tools().await;

        // Phase 2: research.
        let context = self
            .optional_phase(
                &available,
                "search_query",
                args_of(json!({ "query": params.topic, "top_k": 3 })),
            )
            .await;

        // Phase 3: illustration.
        let illustration = self
            .optional_phase(
                &available,
                "image_generate",
                args_of(json!({ "prompt": format!("Cover illustration for: {}", params.topic) })),
            )
            .await;

        // Phase 4: assembly.
        let phases = json!({
            "research": context.is_some(),
            "illustration": illustration.is_some(),
        });
        Ok(CallResult::json(json!({
            "topic": params.topic,
            "style": params.style,
            "context": context,
            "illustration": illustration,
            "phases": phases,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_requires_jwt() {
        let client = McpClient::for_endpoint("http://127.0.0.1:1/mcp");
        let def = AgentComposeTool::definition(client);
        assert_eq!(def.manifest.name, "agent_compose");
        assert!(def.requires_jwt);
    }

    #[test]
    fn test_result_payload_flattening() {
        let single = CallResult::json(json!({ "k": 1 }));
        assert_eq!(result_payload(&single), json!({ "k": 1 }));

        let mixed = CallResult {
            content: vec![ContentItem::text("a"), ContentItem::json(json!(2))],
            is_error: None,
        };
        assert_eq!(result_payload(&mixed), json!(["a", 2]));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_bare_draft() {
        // Nothing listens on this endpoint: discovery yields no tools and
        // every optional phase is skipped, but assembly still succeeds.
        let client = McpClient::for_endpoint("http://127.0.0.1:1/mcp");
        let def = AgentComposeTool::definition(client);

        let args = json!({ "topic": "zk rollups" }).as_object().cloned().unwrap();
        let result = def.handler.call(args).await.unwrap();
        assert!(!result.is_error());

        let payload = result_payload(&result);
        assert_eq!(payload["topic"], json!("zk rollups"));
        assert_eq!(payload["phases"]["research"], json!(false));
        assert_eq!(payload["phases"]["illustration"], json!(false));
    }

    #[tokio::test]
    async fn test_empty_topic_is_domain_error() {
        let client = McpClient::for_endpoint("http://127.0.0.1:1/mcp");
        let def = AgentComposeTool::definition(client);
        let args = json!({ "topic": " " }).as_object().cloned().unwrap();
        let result = def.handler.call(args).await.unwrap();
        assert!(result.is_error());
    }
}
