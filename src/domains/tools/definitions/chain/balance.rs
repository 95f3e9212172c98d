//! Chain balance tool definition.
//!
//! Reads an address balance from the configured JSON-RPC node. Chain
//! semantics stay on the node side; this tool only shapes the request and
//! relays the answer.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::core::protocol::{CallResult, JsonObject, ToolManifest};
use crate::domains::tools::definitions::parse_args;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::{ToolDefinition, ToolHandler};

/// Parameters for the chain balance tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChainBalanceParams {
    /// Account address to query.
    #[schemars(description = "Account address to query (0x-prefixed)")]
    pub address: String,

    /// Block tag to query at (default: "latest").
    #[schemars(description = "Block tag: 'latest', 'pending', or a block number")]
    #[serde(default)]
    pub block: Option<String>,
}

/// Chain balance tool - reads an account balance over JSON-RPC.
pub struct ChainBalanceTool {
    http: reqwest::Client,
    rpc_url: String,
}

impl ChainBalanceTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "chain_balance";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Read the balance of an account from the blockchain. Returns the raw balance as reported by the RPC node.";

    /// Build the registrable definition. Public reads need no JWT.
    pub fn definition(http: reqwest::Client, rpc_url: String) -> ToolDefinition {
        ToolDefinition {
            manifest: ToolManifest {
                name: Self::NAME.to_string(),
                description: Some(Self::DESCRIPTION.to_string()),
                input_schema: schemars::schema_for!(ChainBalanceParams).to_value(),
            },
            requires_jwt: false,
            handler: Arc::new(Self { http, rpc_url }),
        }
    }
}

#[async_trait]
impl ToolHandler for ChainBalanceTool {
    #[instrument(name = "chain_balance", skip_all)]
    async fn call(&self, args: JsonObject) -> Result<CallResult, ToolError> {
        let params: ChainBalanceParams = parse_args(args)?;
        let block = params.block.as_deref().unwrap_or("latest");
        info!(address = %params.address, block, "chain balance requested");

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getBalance",
            "params": [params.address, block]
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ToolError::upstream(format!("RPC request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::upstream(format!("RPC response was not JSON: {e}")))?;

        if let Some(error) = body.get("error") {
            warn!(%error, "RPC node returned an error");
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("RPC error");
            return Ok(CallResult::error(format!("Balance read failed: {message}")));
        }

        let balance = body.get("result").cloned().unwrap_or(Value::Null);
        Ok(CallResult::json(json!({
            "address": params.address,
            "block": block,
            "balance": balance,
        })))
    }
}
