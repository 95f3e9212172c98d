//! Chain transfer tool definition.
//!
//! Submits a transfer order to the configured relayer. The sender identity
//! comes exclusively from the dispatcher-injected `__jwt`; a caller cannot
//! name an arbitrary sender. Transfers are not idempotent, so ambiguous
//! failures must not be retried blindly by callers.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::core::protocol::{CallResult, JsonObject, ToolManifest};
use crate::domains::tools::definitions::{injected_jwt, parse_args};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::{ToolDefinition, ToolHandler};

/// Parameters for the chain transfer tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChainTransferParams {
    /// Recipient address.
    #[schemars(description = "Recipient address (0x-prefixed)")]
    pub to: String,

    /// Amount to transfer, as a decimal string in the chain's base unit.
    #[schemars(description = "Amount in the chain's base unit, as a decimal string")]
    pub amount: String,

    /// Optional memo recorded with the transfer.
    #[schemars(description = "Optional memo recorded with the transfer")]
    #[serde(default)]
    pub memo: Option<String>,
}

/// Chain transfer tool - submits a transfer order on behalf of the caller.
pub struct ChainTransferTool {
    http: reqwest::Client,
    relayer_url: String,
    relayer_key: String,
}

impl ChainTransferTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "chain_transfer";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Send funds from the authenticated wallet to a recipient via the relayer. The sender is always the verified caller.";

    /// Build the registrable definition. Transfers always require a JWT.
    pub fn definition(
        http: reqwest::Client,
        relayer_url: String,
        relayer_key: String,
    ) -> ToolDefinition {
        ToolDefinition {
            manifest: ToolManifest {
                name: Self::NAME.to_string(),
                description: Some(Self::DESCRIPTION.to_string()),
                input_schema: schemars::schema_for!(ChainTransferParams).to_value(),
            },
            requires_jwt: true,
            handler: Arc::new(Self {
                http,
                relayer_url,
                relayer_key,
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ChainTransferTool {
    #[instrument(name = "chain_transfer", skip_all)]
    async fn call(&self, args: JsonObject) -> Result<CallResult, ToolError> {
        let sender = injected_jwt(&args)
            .and_then(|jwt| jwt.address)
            .ok_or_else(|| {
                ToolError::unauthorized("transfer requires an authenticated sender identity")
            })?;
        let params: ChainTransferParams = parse_args(args)?;

        if params.to.trim().is_empty() {
            return Ok(CallResult::error("Transfer failed: empty recipient"));
        }
        info!(from = %sender, to = %params.to, "submitting transfer order");

        let order = json!({
            "from": sender,
            "to": params.to,
            "amount": params.amount,
            "memo": params.memo,
        });

        let response = self
            .http
            .post(&self.relayer_url)
            .header("x-api-key", &self.relayer_key)
            .json(&order)
            .send()
            .await
            .map_err(|e| ToolError::upstream(format!("relayer request failed: {e}")))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            warn!(%status, "relayer rejected the transfer");
            let reason = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("relayer rejected the transfer");
            return Ok(CallResult::error(format!("Transfer failed: {reason}")));
        }

        Ok(CallResult::json(json!({
            "from": sender,
            "to": params.to,
            "amount": params.amount,
            "receipt": body,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ToolDefinition {
        ChainTransferTool::definition(
            reqwest::Client::new(),
            "http://relayer".to_string(),
            "key".to_string(),
        )
    }

    #[test]
    fn test_definition_requires_jwt() {
        let def = tool();
        assert_eq!(def.manifest.name, "chain_transfer");
        assert!(def.requires_jwt);
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let def = tool();
        let args = json!({ "to": "0xB", "amount": "10" })
            .as_object()
            .cloned()
            .unwrap();
        let err = def.handler.call(args).await.unwrap_err();
        assert!(matches!(err, ToolError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_caller_supplied_sender_is_ignored() {
        // A caller naming a "from" argument gains nothing: the handler only
        // reads the injected identity, and without it the call is refused.
        let def = tool();
        let args = json!({ "from": "0xEVIL", "to": "0xB", "amount": "10" })
            .as_object()
            .cloned()
            .unwrap();
        let err = def.handler.call(args).await.unwrap_err();
        assert!(matches!(err, ToolError::Unauthorized(_)));
    }
}
