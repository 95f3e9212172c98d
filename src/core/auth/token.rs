//! Credential extraction from inbound requests.
//!
//! The resolver never reads transport types directly; the HTTP boundary
//! flattens whatever it received into [`RequestCredentials`] so in-process
//! callers can construct the same shape without an HTTP request.

use std::collections::HashMap;

use axum::http::{HeaderMap, header};

/// Cookie names recognized as JWT carriers, in lookup order.
pub const TOKEN_COOKIES: [&str; 2] = ["access_token", "jwt"];

/// Credential material extracted from one inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// Bearer token from the Authorization header, if present.
    pub bearer: Option<String>,

    /// Cookies from the Cookie header.
    pub cookies: HashMap<String, String>,
}

impl RequestCredentials {
    /// Build credentials carrying only a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
            cookies: HashMap::new(),
        }
    }

    /// Extract credentials from HTTP request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer_token);

        let cookies = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(parse_cookie_header)
            .unwrap_or_default();

        Self { bearer, cookies }
    }

    /// Look up a recognized token cookie, first non-empty value wins.
    /// An empty cookie does not shadow a later name.
    pub fn token_cookie(&self) -> Option<&str> {
        TOKEN_COOKIES.iter().find_map(|name| {
            self.cookies
                .get(*name)
                .map(String::as_str)
                .filter(|token| !token.trim().is_empty())
        })
    }
}

/// Extract a bearer token from an Authorization header value.
///
/// Expected format: "Bearer <token>"
/// Returns None if token is missing, empty/whitespace-only, or format is invalid.
pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    auth_header.strip_prefix("Bearer ").and_then(|s| {
        if s.trim().is_empty() {
            None
        } else {
            // Preserve the original token, don't trim internal whitespace
            Some(s.to_string())
        }
    })
}

/// Parse a Cookie header into name/value pairs.
///
/// Malformed segments are skipped rather than failing the whole header.
pub fn parse_cookie_header(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|segment| {
            let (name, value) = segment.trim().split_once('=')?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer tok"), Some("tok".to_string()));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer    "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("tok"), None);
    }

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header("access_token=abc; jwt=def; theme=dark");
        assert_eq!(cookies.get("access_token").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("jwt").map(String::as_str), Some("def"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));

        let malformed = parse_cookie_header("oops; =bad; ok=1");
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed.get("ok").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_token_cookie_priority() {
        let creds = RequestCredentials {
            bearer: None,
            cookies: parse_cookie_header("jwt=second; access_token=first"),
        };
        assert_eq!(creds.token_cookie(), Some("first"));

        let jwt_only = RequestCredentials {
            bearer: None,
            cookies: parse_cookie_header("jwt=second"),
        };
        assert_eq!(jwt_only.token_cookie(), Some("second"));
    }

    #[test]
    fn test_empty_cookie_falls_through_to_next_name() {
        let creds = RequestCredentials {
            bearer: None,
            cookies: parse_cookie_header("access_token=; jwt=real-tok"),
        };
        assert_eq!(creds.token_cookie(), Some("real-tok"));

        let whitespace = RequestCredentials {
            bearer: None,
            cookies: parse_cookie_header("access_token=  ; jwt=real-tok"),
        };
        assert_eq!(whitespace.token_cookie(), Some("real-tok"));

        let both_empty = RequestCredentials {
            bearer: None,
            cookies: parse_cookie_header("access_token=; jwt="),
        };
        assert_eq!(both_empty.token_cookie(), None);
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok"),
        );
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("access_token=cookie-tok"),
        );

        let creds = RequestCredentials::from_headers(&headers);
        assert_eq!(creds.bearer.as_deref(), Some("tok"));
        assert_eq!(creds.token_cookie(), Some("cookie-tok"));
    }
}
