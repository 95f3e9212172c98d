//! Image generation tool definition.
//!
//! Forwards a prompt to the configured image provider. Prompt content and
//! model behavior are the provider's business; this tool relays the
//! provider's payload verbatim.

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

/// Default image endpoint when none is configured.
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

fn default_size() -> String {
    "1024x1024".to_string()
}

/// Parameters for the image generation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ImageGenerateParams {
    /// Text prompt describing the image.
    #[schemars(description = "Text prompt describing the image to generate")]
    pub prompt: String,

    /// Image size (default: "1024x1024").
    #[schemars(description = "Image size, e.g. '1024x1024'")]
    #[serde(default = "default_size")]
    pub size: String,
}

/// Image generation tool - produces an image from a text prompt.
pub struct ImageGenerateTool {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ImageGenerateTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "image_generate";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Generate an image from a text prompt using the configured model provider.";

    /// Build the registrable definition. Generation costs money, so it is
    /// gated on a verified caller.
    pub fn definition(
        http: reqwest::Client,
        endpoint: Option<String>,
        api_key: Option<String>,
    ) -> ToolDefinition {
        ToolDefinition {
            manifest: ToolManifest {
                name: Self::NAME.to_string(),
                description: Some(Self::DESCRIPTION.to_string()),
                input_schema: schemars::schema_for!(ImageGenerateParams).to_value(),
            },
            requires_jwt: true,
            handler: Arc::new(Self {
                http,
                endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                api_key,
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ImageGenerateTool {
    #[instrument(name = "image_generate", skip_all)]
    async fn call(&self, args: JsonObject) -> Result<CallResult, ToolError> {
        let params: ImageGenerateParams = parse_args(args)?;
        if params.prompt.trim().is_empty() {
            return Ok(CallResult::error("Image generation failed: empty prompt"));
        }
        info!(size = %params.size, "image generation requested");

        let mut request = self.http.post(&self.endpoint).json(&json!({
            "prompt": params.prompt,
            "size": params.size,
            "n": 1,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ToolError::upstream(format!("image request failed: {e}")))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let reason = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("provider rejected the request");
            return Ok(CallResult::error(format!(
                "Image generation failed: {reason}"
            )));
        }

        Ok(CallResult::json(json!({
            "prompt": params.prompt,
            "size": params.size,
            "result": body,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_requires_jwt() {
        let def = ImageGenerateTool::definition(reqwest::Client::new(), None, None);
        assert_eq!(def.manifest.name, "image_generate");
        assert!(def.requires_jwt);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_domain_error() {
        let def = ImageGenerateTool::definition(reqwest::Client::new(), None, None);
        let args = json!({ "prompt": "" }).as_object().cloned().unwrap();
        let result = def.handler.call(args).await.unwrap();
        assert!(result.is_error());
    }
}
