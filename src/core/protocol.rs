//! Wire contract for the MCP tool-calling surface.
//!
//! These are the shapes that cross the HTTP boundary: requests discriminated
//! by `method`, tool manifests, tool call results, and the transport-level
//! error envelope. No logic lives here beyond constructors; both the server
//! transport and the client parse against these types so the two sides can
//! never drift apart.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON object alias used for tool arguments and claim payloads.
pub type JsonObject = serde_json::Map<String, Value>;

/// Error code for a request that could not be dispatched (validation or
/// internal failure).
pub const INTERNAL_ERROR: i32 = -32603;

/// Error code for a request rejected before dispatch because authentication
/// was required and missing or invalid.
pub const AUTH_REQUIRED: i32 = -32001;

// ============================================================================
// Requests
// ============================================================================

/// An inbound request, discriminated by its `method` field.
///
/// Unknown fields are dropped during deserialization; schema-declared fields
/// survive a parse/re-serialize round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum McpRequest {
    /// List the manifests of all registered tools.
    #[serde(rename = "tools/list")]
    ListTools,

    /// Invoke a single tool by name.
    #[serde(rename = "tools/call")]
    CallTool {
        /// Target tool and its arguments.
        params: CallToolParams,
    },
}

impl McpRequest {
    /// Build a `tools/call` request body.
    pub fn call(name: impl Into<String>, arguments: Option<JsonObject>) -> Self {
        Self::CallTool {
            params: CallToolParams {
                name: name.into(),
                arguments,
            },
        }
    }
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Name of the tool to invoke.
    pub name: String,

    /// Arguments forwarded to the tool handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<JsonObject>,
}

// ============================================================================
// Manifests
// ============================================================================

/// Wire-visible description of a tool.
///
/// Authorization metadata is server-only and must never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolManifest {
    /// Unique tool name.
    pub name: String,

    /// Human-readable description shown to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON-Schema for the tool's arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Result of a `tools/list` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Manifests in registration order.
    pub tools: Vec<ToolManifest>,
}

// ============================================================================
// Call results
// ============================================================================

/// One element of a tool's output, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    /// Plain text content.
    Text {
        /// The text payload.
        text: String,
    },

    /// Structured JSON content.
    Json {
        /// The JSON payload.
        data: Value,
    },
}

impl ContentItem {
    /// Create a text content item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a JSON content item.
    pub fn json(data: Value) -> Self {
        Self::Json { data }
    }
}

/// Uniform envelope returned by every tool invocation.
///
/// Domain failures set `isError: true` and explain themselves in a text
/// item; transport-level failures use [`ErrorEnvelope`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    /// Ordered output items.
    pub content: Vec<ContentItem>,

    /// Present and true when the tool signals a domain failure.
    #[serde(rename = "isError", default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallResult {
    /// Successful result with a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: None,
        }
    }

    /// Successful result with a single JSON item.
    pub fn json(data: Value) -> Self {
        Self {
            content: vec![ContentItem::json(data)],
            is_error: None,
        }
    }

    /// Failed result with a human-readable explanation.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            is_error: Some(true),
        }
    }

    /// Whether this result signals a domain failure.
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

// ============================================================================
// Error envelope
// ============================================================================

/// Transport-level failure shape, used only for requests that could not be
/// dispatched at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error payload.
    pub error: ErrorObject,
}

/// Body of an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// One of the fixed dispatch error codes.
    pub code: i32,

    /// Human-readable message.
    pub message: String,

    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorEnvelope {
    /// Build an envelope with an explicit code.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            error: ErrorObject {
                code,
                message: message.into(),
                data: None,
            },
        }
    }

    /// Dispatch/internal failure envelope.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    /// Authentication-required envelope.
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(AUTH_REQUIRED, message)
    }
}
