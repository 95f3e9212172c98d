//! Token verification.
//!
//! The resolver only depends on the [`TokenVerifier`] trait; the shipped
//! implementation verifies Ed25519-signed JWTs (`alg: "EdDSA"`) in compact
//! serialization. Verifier errors carry detail for logs, but the resolver
//! collapses them all to one generic caller-facing message.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use ed25519_dalek::{Signature, VerifyingKey};
use serde_json::Value;

use super::AuthError;
use crate::core::protocol::JsonObject;

/// Outcome of a successful token verification.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    /// Verified claim payload.
    pub payload: JsonObject,

    /// Token identifier (`jti` claim), if the token carries one.
    pub token_id: Option<String>,
}

/// External verifier consumed by the auth resolver.
pub trait TokenVerifier: Send + Sync {
    /// Verify a raw token and return its claims, or a typed failure.
    fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError>;
}

/// Ed25519 JWT verifier.
///
/// Accepts compact-serialized JWTs signed with EdDSA over
/// `<header>.<payload>` and rejects expired tokens via the `exp` claim.
pub struct Ed25519Verifier {
    key: VerifyingKey,
}

impl Ed25519Verifier {
    /// Create a verifier from a raw public key.
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Create a verifier from a base64-encoded 32-byte public key.
    pub fn from_base64(encoded: &str) -> Result<Self, AuthError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AuthError::InvalidKey(format!("bad base64 public key: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AuthError::InvalidKey("public key must be 32 bytes".to_string()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| AuthError::InvalidKey(format!("invalid Ed25519 public key: {e}")))?;
        Ok(Self::new(key))
    }
}

fn decode_part(part: &str, what: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| AuthError::InvalidToken(format!("bad {what} encoding: {e}")))
}

impl TokenVerifier for Ed25519Verifier {
    fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => {
                    return Err(AuthError::InvalidToken(
                        "expected compact JWS with three segments".to_string(),
                    ));
                }
            };

        let header: Value = serde_json::from_slice(&decode_part(header_b64, "header")?)
            .map_err(|e| AuthError::InvalidToken(format!("bad header JSON: {e}")))?;
        match header.get("alg").and_then(Value::as_str) {
            Some("EdDSA") => {}
            other => {
                return Err(AuthError::InvalidToken(format!(
                    "unsupported alg {:?}",
                    other.unwrap_or("none")
                )));
            }
        }

        let signature = Signature::from_slice(&decode_part(signature_b64, "signature")?)
            .map_err(|e| AuthError::InvalidToken(format!("bad signature: {e}")))?;
        let signed = format!("{header_b64}.{payload_b64}");
        self.key
            .verify_strict(signed.as_bytes(), &signature)
            .map_err(|_| AuthError::SignatureMismatch)?;

        let payload: Value = serde_json::from_slice(&decode_part(payload_b64, "payload")?)
            .map_err(|e| AuthError::InvalidToken(format!("bad payload JSON: {e}")))?;
        let payload = match payload {
            Value::Object(map) => map,
            _ => {
                return Err(AuthError::InvalidToken(
                    "payload is not a JSON object".to_string(),
                ));
            }
        };

        if let Some(exp) = payload.get("exp").and_then(Value::as_i64)
            && exp <= chrono::Utc::now().timestamp()
        {
            return Err(AuthError::Expired);
        }

        let token_id = payload
            .get("jti")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(VerifiedToken { payload, token_id })
    }
}
