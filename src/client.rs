//! MCP client.
//!
//! Symmetric caller for the tool-calling endpoint, used both by external
//! consumers and by same-process collaborators (the authoring agent composes
//! tool calls through this client). Timeout discipline lives here: the
//! server imposes none, so every request carries this client's deadline.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::core::protocol::{CallResult, JsonObject, ListToolsResult, McpRequest};

/// Errors raised by the MCP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The request was aborted by the client-side deadline.
    #[error("request timed out or was aborted")]
    Timeout,

    /// The request failed below HTTP (connect, DNS, protocol).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body did not match the wire contract.
    #[error("response did not match the wire contract: {0}")]
    Schema(String),

    /// The server answered 200 with a transport-level error envelope.
    #[error("server rejected the request ({code}): {message}")]
    Rpc {
        /// Dispatch error code.
        code: i32,
        /// Error message.
        message: String,
    },
}

fn map_reqwest(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(err.to_string())
    }
}

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// MCP endpoint URL.
    pub endpoint: String,

    /// JWT attached as a bearer token.
    pub jwt: Option<String>,

    /// Whether the endpoint requires a JWT. The bearer header is attached
    /// only when this is set and a JWT is configured.
    pub requires_jwt: bool,

    /// Per-request deadline.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Default per-request deadline.
    pub fn default_timeout() -> Duration {
        Duration::from_secs(30)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("jwt", &self.jwt.as_ref().map(|_| "[REDACTED]"))
            .field("requires_jwt", &self.requires_jwt)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// MCP client over HTTP.
#[derive(Debug, Clone)]
pub struct McpClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl McpClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create an unauthenticated client for an endpoint with the default
    /// deadline.
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self::new(ClientConfig {
            endpoint: endpoint.into(),
            jwt: None,
            requires_jwt: false,
            timeout: ClientConfig::default_timeout(),
        })
    }

    /// Override the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Attach a JWT and mark the endpoint as requiring one.
    pub fn with_jwt(mut self, jwt: impl Into<String>) -> Self {
        self.config.jwt = Some(jwt.into());
        self.config.requires_jwt = true;
        self
    }

    async fn post(&self, request: &McpRequest) -> Result<Value, ClientError> {
        let mut builder = self
            .http
            .post(&self.config.endpoint)
            .json(request)
            .timeout(self.config.timeout);
        if self.config.requires_jwt
            && let Some(jwt) = &self.config.jwt
        {
            builder = builder.bearer_auth(jwt);
        }

        let response = builder.send().await.map_err(map_reqwest)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest)?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| ClientError::Schema(e.to_string()))?;

        if let Some(error) = value.get("error") {
            return Err(ClientError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0) as i32,
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        Ok(value)
    }

    /// Invoke a tool and return its validated result.
    ///
    /// The returned [`CallResult`] may still carry `isError: true`; that is
    /// a well-formed domain failure, not a client error.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallResult, ClientError> {
        let request = McpRequest::call(name, arguments);
        let value = self.post(&request).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Schema(e.to_string()))
    }

    /// List the tools the endpoint offers.
    ///
    /// Discovery is advisory: any failure (network, non-2xx, schema) returns
    /// an empty list rather than an error so callers degrade gracefully.
    pub async fn list_tools(&self) -> Vec<crate::core::protocol::ToolManifest> {
        match self.post(&McpRequest::ListTools).await {
            Ok(value) => match serde_json::from_value::<ListToolsResult>(value) {
                Ok(result) => result.tools,
                Err(err) => {
                    warn!(error = %err, "tool listing had unexpected shape");
                    Vec::new()
                }
            },
            Err(err) => {
                warn!(error = %err, "tool listing failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/mcp")
    }

    #[tokio::test]
    async fn test_call_tool_success() {
        let app = Router::new().route(
            "/mcp",
            post(|| async { Json(CallResult::text("done")) }),
        );
        let client = McpClient::for_endpoint(serve(app).await);

        let result = client.call_tool("t1", None).await.unwrap();
        assert!(!result.is_error());
        assert_eq!(result, CallResult::text("done"));
    }

    #[tokio::test]
    async fn test_call_tool_non_2xx_carries_status_and_body() {
        let app = Router::new().route(
            "/mcp",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = McpClient::for_endpoint(serve(app).await);

        let err = client.call_tool("t1", None).await.unwrap_err();
        match &err {
            ClientError::Status { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("500: boom"));
    }

    #[tokio::test]
    async fn test_call_tool_timeout_is_distinct() {
        let app = Router::new().route(
            "/mcp",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(CallResult::text("too late"))
            }),
        );
        let client =
            McpClient::for_endpoint(serve(app).await).with_timeout(Duration::from_millis(10));

        let err = client.call_tool("t1", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
    }

    #[tokio::test]
    async fn test_call_tool_schema_violation_raises() {
        let app = Router::new().route(
            "/mcp",
            post(|| async { Json(json!({ "nope": true })) }),
        );
        let client = McpClient::for_endpoint(serve(app).await);

        let err = client.call_tool("t1", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Schema(_)));
    }

    #[tokio::test]
    async fn test_error_envelope_surfaces_as_rpc_error() {
        let app = Router::new().route(
            "/mcp",
            post(|| async {
                Json(json!({ "error": { "code": -32001, "message": "Authentication required" } }))
            }),
        );
        let client = McpClient::for_endpoint(serve(app).await);

        let err = client.call_tool("t1", None).await.unwrap_err();
        match err {
            ClientError::Rpc { code, message } => {
                assert_eq!(code, -32001);
                assert_eq!(message, "Authentication required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bearer_attached_only_when_required_and_configured() {
        let app = Router::new().route(
            "/mcp",
            post(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none")
                    .to_string();
                Json(CallResult::text(auth))
            }),
        );
        let endpoint = serve(app).await;

        let with_jwt = McpClient::for_endpoint(&endpoint).with_jwt("tok");
        let result = with_jwt.call_tool("t1", None).await.unwrap();
        assert_eq!(result, CallResult::text("Bearer tok"));

        // JWT configured but not required: no header is attached
        let mut config = ClientConfig {
            endpoint: endpoint.clone(),
            jwt: Some("tok".to_string()),
            requires_jwt: false,
            timeout: ClientConfig::default_timeout(),
        };
        let not_required = McpClient::new(config.clone());
        let result = not_required.call_tool("t1", None).await.unwrap();
        assert_eq!(result, CallResult::text("none"));

        // Required but no JWT configured: nothing to attach
        config.jwt = None;
        config.requires_jwt = true;
        let no_jwt = McpClient::new(config);
        let result = no_jwt.call_tool("t1", None).await.unwrap();
        assert_eq!(result, CallResult::text("none"));
    }

    #[tokio::test]
    async fn test_list_tools_success() {
        let app = Router::new().route(
            "/mcp",
            post(|| async {
                Json(json!({ "tools": [
                    { "name": "t1", "inputSchema": { "type": "object" } },
                    { "name": "t2", "inputSchema": { "type": "object" } }
                ] }))
            }),
        );
        let client = McpClient::for_endpoint(serve(app).await);

        let tools = client.list_tools().await;
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_list_tools_degrades_to_empty() {
        // Unreachable endpoint
        let unreachable = McpClient::for_endpoint("http://127.0.0.1:1/mcp")
            .with_timeout(Duration::from_millis(100));
        assert!(unreachable.list_tools().await.is_empty());

        // Non-2xx
        let app = Router::new().route(
            "/mcp",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "nope") }),
        );
        let client = McpClient::for_endpoint(serve(app).await);
        assert!(client.list_tools().await.is_empty());

        // Schema violation
        let app = Router::new().route("/mcp", post(|| async { Json(json!({ "tools": 3 })) }));
        let client = McpClient::for_endpoint(serve(app).await);
        assert!(client.list_tools().await.is_empty());
    }
}
