//! Authentication layer.
//!
//! The [`AuthResolver`] turns an inbound request into an [`AuthResult`]:
//! it hunts for a JWT across the recognized credential sources, delegates
//! to a [`TokenVerifier`], and coerces the verified payload into
//! [`AuthClaims`]. It never returns an error; every failure path is a
//! returned value so callers can decide between transport-level and
//! tool-level rejection.

mod token;
mod verifier;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::core::config::AuthConfig;
use crate::core::protocol::JsonObject;

pub use token::{RequestCredentials, TOKEN_COOKIES, extract_bearer_token, parse_cookie_header};
pub use verifier::{Ed25519Verifier, TokenVerifier, VerifiedToken};

/// Caller-facing message when no credential could be found.
const MISSING_JWT: &str = "Authentication required: missing JWT";

/// Caller-facing message when a credential was found but did not verify.
/// Verifier internals deliberately never reach the caller.
const INVALID_JWT: &str = "Authentication failed: invalid JWT";

/// Errors raised inside the auth layer.
///
/// These stay server-side; the resolver maps them to generic messages.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The configured verifying key could not be decoded.
    #[error("invalid verifying key: {0}")]
    InvalidKey(String),

    /// The token is structurally invalid.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token signature does not match the configured key.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// The token is expired.
    #[error("token expired")]
    Expired,
}

/// Verified identity attributes extracted from a caller's credential.
///
/// Only `address`, `addr` and `sub` are interpreted; everything else is
/// carried opaquely. Missing or non-string fields become absent, never an
/// error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthClaims {
    /// Wallet address claim.
    pub address: Option<String>,

    /// Legacy wallet address claim.
    pub addr: Option<String>,

    /// Subject claim.
    pub sub: Option<String>,

    /// All remaining verified claims, unmodified.
    pub extra: JsonObject,
}

impl AuthClaims {
    /// Coerce a verified payload into the claims shape.
    pub fn from_payload(payload: JsonObject) -> Self {
        let get = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            address: get("address"),
            addr: get("addr"),
            sub: get("sub"),
            extra: payload,
        }
    }

    /// Derive the caller identity, first match wins: `address > addr > sub`.
    pub fn identity(&self) -> Option<&str> {
        const EXTRACTORS: [fn(&AuthClaims) -> Option<&str>; 3] = [
            |c| c.address.as_deref(),
            |c| c.addr.as_deref(),
            |c| c.sub.as_deref(),
        ];
        EXTRACTORS.iter().find_map(|extract| extract(self))
    }
}

/// Outcome of one resolver run. Created fresh per request, consumed
/// server-side, never cached and never sent over the wire.
#[derive(Debug, Clone, Default)]
pub struct AuthResult {
    /// Whether the request is allowed to proceed.
    pub authenticated: bool,

    /// Identifier of the verified token, if any.
    pub token_id: Option<String>,

    /// Verified claims, present only after successful verification.
    pub claims: Option<AuthClaims>,

    /// Caller-facing failure message when not authenticated.
    pub error: Option<String>,
}

impl AuthResult {
    /// Allowed without credential lookup (global switch off).
    pub fn allowed() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    /// Denied with a caller-facing message.
    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Authenticated with verified claims.
    pub fn verified(token_id: Option<String>, claims: AuthClaims) -> Self {
        Self {
            authenticated: true,
            token_id,
            claims: Some(claims),
            error: None,
        }
    }
}

/// Options for one resolver run.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Run the full credential check even when the global switch is off.
    /// Used by per-tool gates.
    pub force: bool,
}

impl VerifyOptions {
    /// Options for a forced per-tool check.
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// Produces an [`AuthResult`] for an inbound call.
pub struct AuthResolver {
    required: bool,
    verifier: Option<Arc<dyn TokenVerifier>>,
}

impl AuthResolver {
    /// Build a resolver from configuration.
    ///
    /// A misconfigured verifying key is fatal here rather than a per-request
    /// failure.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let verifier = match &config.verifying_key {
            Some(encoded) => Some(Arc::new(Ed25519Verifier::from_base64(encoded)?)
                as Arc<dyn TokenVerifier>),
            None => None,
        };
        Ok(Self {
            required: config.required,
            verifier,
        })
    }

    /// Build a resolver with an explicit verifier.
    pub fn with_verifier(required: bool, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            required,
            verifier: Some(verifier),
        }
    }

    /// Whether the deployment-wide authorization switch is on.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Verify the credential attached to a request.
    ///
    /// Token sources are consulted in strict order: Authorization header,
    /// `body.jwt`, `body.data.jwt`, then the recognized cookies. The first
    /// non-empty hit wins; later sources are never consulted.
    pub fn verify(
        &self,
        creds: &RequestCredentials,
        body: Option<&Value>,
        opts: VerifyOptions,
    ) -> AuthResult {
        if !self.required && !opts.force {
            return AuthResult::allowed();
        }

        let Some(token) = find_token(creds, body) else {
            return AuthResult::denied(MISSING_JWT);
        };

        let Some(verifier) = &self.verifier else {
            debug!("token presented but no verifier is configured");
            return AuthResult::denied(INVALID_JWT);
        };

        match verifier.verify(&token) {
            Ok(verified) => AuthResult::verified(
                verified.token_id,
                AuthClaims::from_payload(verified.payload),
            ),
            Err(err) => {
                debug!(error = %err, "JWT verification failed");
                AuthResult::denied(INVALID_JWT)
            }
        }
    }
}

/// Hunt for a token across the recognized sources, in order.
fn find_token(creds: &RequestCredentials, body: Option<&Value>) -> Option<String> {
    let body_jwt = |value: &Value| {
        value
            .get("jwt")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
    };

    creds
        .bearer
        .clone()
        .or_else(|| body.and_then(body_jwt))
        .or_else(|| body.and_then(|b| b.get("data")).and_then(body_jwt))
        .or_else(|| creds.token_cookie().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Verifier that accepts exactly one token and records nothing else.
    struct StubVerifier {
        accept: String,
        payload: JsonObject,
    }

    impl StubVerifier {
        fn accepting(token: &str, payload: Value) -> Arc<dyn TokenVerifier> {
            let payload = match payload {
                Value::Object(map) => map,
                _ => panic!("stub payload must be an object"),
            };
            Arc::new(Self {
                accept: token.to_string(),
                payload,
            })
        }
    }

    impl TokenVerifier for StubVerifier {
        fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
            if token == self.accept {
                Ok(VerifiedToken {
                    payload: self.payload.clone(),
                    token_id: Some("tok-id".to_string()),
                })
            } else {
                Err(AuthError::SignatureMismatch)
            }
        }
    }

    fn resolver(required: bool) -> AuthResolver {
        AuthResolver::with_verifier(
            required,
            StubVerifier::accepting("good", json!({ "sub": "0xC" })),
        )
    }

    #[test]
    fn test_switch_off_short_circuits() {
        let result = resolver(false).verify(
            &RequestCredentials::default(),
            None,
            VerifyOptions::default(),
        );
        assert!(result.authenticated);
        assert!(result.claims.is_none());
    }

    #[test]
    fn test_force_overrides_switch() {
        let result = resolver(false).verify(
            &RequestCredentials::default(),
            None,
            VerifyOptions::forced(),
        );
        assert!(!result.authenticated);
        assert_eq!(result.error.as_deref(), Some(MISSING_JWT));
    }

    #[test]
    fn test_missing_token_message() {
        let result = resolver(true).verify(
            &RequestCredentials::default(),
            Some(&json!({ "method": "tools/list" })),
            VerifyOptions::default(),
        );
        assert!(!result.authenticated);
        assert_eq!(
            result.error.as_deref(),
            Some("Authentication required: missing JWT")
        );
    }

    #[test]
    fn test_invalid_token_message_is_generic() {
        let result = resolver(true).verify(
            &RequestCredentials::bearer("bad"),
            None,
            VerifyOptions::default(),
        );
        assert!(!result.authenticated);
        assert_eq!(
            result.error.as_deref(),
            Some("Authentication failed: invalid JWT")
        );
    }

    #[test]
    fn test_successful_verification() {
        let result = resolver(true).verify(
            &RequestCredentials::bearer("good"),
            None,
            VerifyOptions::default(),
        );
        assert!(result.authenticated);
        assert_eq!(result.token_id.as_deref(), Some("tok-id"));
        let claims = result.claims.expect("claims present");
        assert_eq!(claims.sub.as_deref(), Some("0xC"));
    }

    #[test]
    fn test_header_beats_body_beats_cookie() {
        let body = json!({ "jwt": "body-tok", "data": { "jwt": "nested-tok" } });
        let mut creds = RequestCredentials::bearer("header-tok");
        creds
            .cookies
            .insert("access_token".to_string(), "cookie-tok".to_string());

        assert_eq!(find_token(&creds, Some(&body)).as_deref(), Some("header-tok"));

        creds.bearer = None;
        assert_eq!(find_token(&creds, Some(&body)).as_deref(), Some("body-tok"));

        let nested_only = json!({ "data": { "jwt": "nested-tok" } });
        assert_eq!(
            find_token(&creds, Some(&nested_only)).as_deref(),
            Some("nested-tok")
        );

        assert_eq!(
            find_token(&creds, Some(&json!({}))).as_deref(),
            Some("cookie-tok")
        );

        creds.cookies.clear();
        assert_eq!(find_token(&creds, Some(&json!({}))), None);
    }

    #[test]
    fn test_empty_body_jwt_skipped() {
        let body = json!({ "jwt": "  " });
        let mut creds = RequestCredentials::default();
        creds.cookies.insert("jwt".to_string(), "cookie-tok".to_string());
        assert_eq!(find_token(&creds, Some(&body)).as_deref(), Some("cookie-tok"));
    }

    #[test]
    fn test_no_verifier_rejects_generically() {
        let resolver = AuthResolver {
            required: true,
            verifier: None,
        };
        let result = resolver.verify(
            &RequestCredentials::bearer("anything"),
            None,
            VerifyOptions::default(),
        );
        assert!(!result.authenticated);
        assert_eq!(result.error.as_deref(), Some(INVALID_JWT));
    }

    #[test]
    fn test_claims_coercion_tolerates_odd_shapes() {
        let claims = AuthClaims::from_payload(
            json!({ "address": 42, "sub": "0xC", "role": "admin" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        // Non-string address becomes absent, not an error
        assert!(claims.address.is_none());
        assert_eq!(claims.sub.as_deref(), Some("0xC"));
        assert_eq!(claims.extra["role"], json!("admin"));
    }

    #[test]
    fn test_identity_precedence() {
        let full = AuthClaims::from_payload(
            json!({ "address": "0xA", "addr": "0xB", "sub": "0xC" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(full.identity(), Some("0xA"));

        let addr_sub = AuthClaims {
            addr: Some("0xB".to_string()),
            sub: Some("0xC".to_string()),
            ..AuthClaims::default()
        };
        assert_eq!(addr_sub.identity(), Some("0xB"));

        let sub_only = AuthClaims {
            sub: Some("0xC".to_string()),
            ..AuthClaims::default()
        };
        assert_eq!(sub_only.identity(), Some("0xC"));

        assert_eq!(AuthClaims::default().identity(), None);
    }
}
