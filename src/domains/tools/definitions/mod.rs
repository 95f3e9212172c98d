//! Tool definitions - one file per tool.
//!
//! Each tool defines a schemars-derived parameter struct (the source of its
//! wire-visible `inputSchema`), `NAME`/`DESCRIPTION` constants, and a
//! handler owning its outbound collaborators.

pub mod agent;
pub mod chain;
pub mod image;
pub mod search;

pub use agent::AgentComposeTool;
pub use chain::{ChainBalanceTool, ChainTransferTool};
pub use image::ImageGenerateTool;
pub use search::SearchQueryTool;

use serde::Deserialize;
use serde_json::Value;

use crate::core::protocol::JsonObject;

use super::error::ToolError;

/// Argument key under which the dispatcher injects verified identity.
pub const JWT_ARG: &str = "__jwt";

/// Verified identity injected into tool arguments by the dispatcher.
///
/// Handlers that act on behalf of a caller read the sender from here and
/// never from caller-supplied arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct InjectedJwt {
    /// Derived caller identity (address-over-sub precedence).
    pub address: Option<String>,

    /// Subject claim, when distinct from the address.
    #[serde(default)]
    pub sub: Option<String>,

    /// Identifier of the verified token.
    #[serde(rename = "tokenId", default)]
    pub token_id: Option<String>,
}

/// Read the injected identity out of tool arguments, if present.
pub fn injected_jwt(args: &JsonObject) -> Option<InjectedJwt> {
    args.get(JWT_ARG)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Parse tool arguments into a typed parameter struct.
///
/// Unknown fields (including the injected `__jwt`) are ignored; a shape
/// mismatch is an invalid-arguments failure.
pub fn parse_args<T: serde::de::DeserializeOwned>(args: JsonObject) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_injected_jwt_roundtrip() {
        let args = json!({
            "to": "0xB",
            "__jwt": { "address": "0xA", "sub": "0xC", "tokenId": "tok-1" }
        })
        .as_object()
        .cloned()
        .unwrap();

        let jwt = injected_jwt(&args).expect("injected identity present");
        assert_eq!(jwt.address.as_deref(), Some("0xA"));
        assert_eq!(jwt.token_id.as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_injected_jwt_absent() {
        let args = json!({ "to": "0xB" }).as_object().cloned().unwrap();
        assert!(injected_jwt(&args).is_none());
    }

    #[test]
    fn test_parse_args_ignores_injection() {
        #[derive(serde::Deserialize)]
        struct Params {
            to: String,
        }

        let args = json!({ "to": "0xB", "__jwt": { "address": "0xA" } })
            .as_object()
            .cloned()
            .unwrap();
        let params: Params = parse_args(args).expect("parses despite __jwt");
        assert_eq!(params.to, "0xB");
    }

    #[test]
    fn test_parse_args_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Params {
            #[allow(dead_code)]
            to: String,
        }

        let args = json!({ "to": 42 }).as_object().cloned().unwrap();
        let err = parse_args::<Params>(args).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
