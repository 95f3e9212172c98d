//! Request dispatcher.
//!
//! One state machine per request: Validate -> Route -> (call path) Lookup ->
//! AuthGate -> Invoke -> Shape. Structural failures above method routing
//! produce an [`ErrorEnvelope`]; everything on the `tools/call` path,
//! including unknown tools and failed per-tool auth, produces a
//! [`CallResult`] so the caller always gets a well-formed answer to the
//! action it named.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::core::auth::{AuthResolver, RequestCredentials, VerifyOptions};
use crate::core::protocol::{
    CallResult, ErrorEnvelope, JsonObject, ListToolsResult, McpRequest,
};
use crate::domains::tools::ToolRegistry;

/// Fallback message when per-tool auth fails without a resolver message.
const AUTH_FALLBACK: &str = "Authentication required";

/// Terminal outcome of one dispatch.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DispatchReply {
    /// `tools/list` succeeded.
    Tools(ListToolsResult),

    /// `tools/call` ran; the result may still carry `isError`.
    Call(CallResult),

    /// The request could not be dispatched at all.
    Error(ErrorEnvelope),
}

impl DispatchReply {
    /// Whether this reply is a transport-level error envelope.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Validates, routes, gates, and invokes tool requests.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    resolver: Arc<AuthResolver>,
}

impl Dispatcher {
    /// Create a dispatcher over a built registry and resolver.
    pub fn new(registry: Arc<ToolRegistry>, resolver: Arc<AuthResolver>) -> Self {
        Self { registry, resolver }
    }

    /// Dispatch one raw request body.
    ///
    /// `creds` carries whatever credential material the boundary extracted;
    /// the raw body is also consulted for body-embedded tokens.
    pub async fn dispatch(&self, body: &Value, creds: &RequestCredentials) -> DispatchReply {
        let request: McpRequest = match serde_json::from_value(body.clone()) {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "request failed validation");
                return DispatchReply::Error(ErrorEnvelope::internal(format!(
                    "Invalid request: {err}"
                )));
            }
        };

        match request {
            McpRequest::ListTools => DispatchReply::Tools(ListToolsResult {
                tools: self.registry.list(),
            }),
            McpRequest::CallTool { params } => {
                DispatchReply::Call(self.call_tool(body, creds, params.name, params.arguments).await)
            }
        }
    }

    async fn call_tool(
        &self,
        body: &Value,
        creds: &RequestCredentials,
        name: String,
        arguments: Option<JsonObject>,
    ) -> CallResult {
        let Some(def) = self.registry.get(&name) else {
            return CallResult::error(format!("Tool not found: {name}"));
        };

        let mut args = arguments.unwrap_or_default();

        if def.requires_jwt {
            // Forced check: per-tool gates apply even when the global
            // switch is off, and independently of any boundary precheck.
            let auth = self.resolver.verify(creds, Some(body), VerifyOptions::forced());
            if !auth.authenticated {
                return CallResult::error(
                    auth.error.unwrap_or_else(|| AUTH_FALLBACK.to_string()),
                );
            }

            let claims = auth.claims.unwrap_or_default();
            match claims.identity() {
                Some(identity) => {
                    // Caller-supplied __jwt is never trusted; always overwrite.
                    args.insert(
                        "__jwt".to_string(),
                        json!({
                            "address": identity,
                            "sub": claims.sub,
                            "tokenId": auth.token_id,
                        }),
                    );
                }
                None => {
                    warn!(tool = %name, "verified token carries no identity claim, invoking without __jwt");
                }
            }
        }

        match def.handler.call(args).await {
            Ok(result) => result,
            Err(err) => {
                warn!(tool = %name, error = %err, "tool execution failed");
                CallResult::error(format!("Tool execution failed: {err}"))
            }
        }
    }
}
