//! HTTP server entry.
//!
//! The HTTP-facing envelope around the dispatcher: global authorization
//! gate, early per-tool precheck, then delegation. Status codes carry the
//! transport-level verdict: 401 means the request was rejected before
//! dispatch, 200 means the dispatcher ran (regardless of `isError`), 500
//! means something unexpected broke and the caller learns nothing more.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use super::{HttpConfig, TransportError, TransportResult};
use crate::core::auth::{AuthResolver, RequestCredentials, VerifyOptions};
use crate::core::dispatch::Dispatcher;
use crate::core::error::Error;
use crate::core::protocol::ErrorEnvelope;
use crate::domains::tools::ToolRegistry;

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Request dispatcher.
    pub dispatcher: Arc<Dispatcher>,

    /// Tool registry, consulted by the per-tool precheck.
    pub registry: Arc<ToolRegistry>,

    /// Auth resolver for the global gate and precheck.
    pub resolver: Arc<AuthResolver>,

    /// Server name reported on the info endpoint.
    pub server_name: String,

    /// Server version reported on the info endpoint.
    pub server_version: String,

    /// RPC path reported on the info endpoint, matching the mounted route.
    pub rpc_path: String,
}

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Run the HTTP transport until shutdown.
    pub async fn run(self, state: AppState) -> TransportResult<()> {
        let addr = self.config.address();
        let app = build_router(state, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} ({})", addr, self.config.description());
        info!("  → MCP:    POST {}", self.config.rpc_path);
        info!("  → Health: GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the axum router for the MCP surface.
pub fn build_router(state: AppState, config: &HttpConfig) -> Router {
    let mut app = Router::new()
        .route(&config.rpc_path, post(handle_rpc))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .with_state(state);

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.server_name,
        "version": state.server_version,
        "endpoints": {
            "mcp": state.rpc_path,
            "health": "/health"
        },
        "methods": ["tools/list", "tools/call"],
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn unauthorized(message: Option<String>) -> Response {
    let message = message.unwrap_or_else(|| "Authentication required".to_string());
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorEnvelope::auth_required(message)),
    )
        .into_response()
}

/// Handle MCP requests.
async fn handle_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match process_rpc(&state, &headers, &body).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "unexpected failure while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorEnvelope::internal("Internal server error")),
            )
                .into_response()
        }
    }
}

async fn process_rpc(
    state: &AppState,
    headers: &HeaderMap,
    body: &str,
) -> Result<Response, Error> {
    // A body that is not JSON at all cannot be dispatched; same envelope as
    // a validation failure, with the parser's reason.
    let body: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            let envelope = ErrorEnvelope::internal(format!("Invalid request: {err}"));
            return Ok((StatusCode::OK, Json(envelope)).into_response());
        }
    };

    let creds = RequestCredentials::from_headers(headers);

    // Global gate: deployment-wide switch, non-forced.
    if state.resolver.required() {
        let auth = state
            .resolver
            .verify(&creds, Some(&body), VerifyOptions::default());
        if !auth.authenticated {
            return Ok(unauthorized(auth.error));
        }
    }

    // Early per-tool precheck: fail fast before any dispatcher work. The
    // dispatcher gates again on its own; neither check is allowed to be
    // the sole enforcement point.
    if body.get("method").and_then(Value::as_str) == Some("tools/call")
        && let Some(name) = body
            .pointer("/params/name")
            .and_then(Value::as_str)
        && let Some(def) = state.registry.get(name)
        && def.requires_jwt
    {
        let auth = state
            .resolver
            .verify(&creds, Some(&body), VerifyOptions::forced());
        if !auth.authenticated {
            return Ok(unauthorized(auth.error));
        }
    }

    let reply = state.dispatcher.dispatch(&body, &creds).await;
    // Serialize here rather than in the response writer so a failure
    // surfaces as the generic 500 envelope instead of an empty reply.
    let reply = serde_json::to_value(&reply)?;
    Ok((StatusCode::OK, Json(reply)).into_response())
}
