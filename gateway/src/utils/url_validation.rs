//! URL validation for configured endpoints.
//!
//! Every outbound endpoint the gateway dials comes from configuration. This
//! module checks each one parses, carries a host, and uses a scheme the
//! caller can actually speak.

use thiserror::Error;
use url::Url;

/// Schemes accepted for the upstream realtime socket.
pub const WEBSOCKET_SCHEMES: &[&str] = &["ws", "wss"];

/// Schemes accepted for REST collaborators.
pub const HTTP_SCHEMES: &[&str] = &["http", "https"];

/// Errors that can occur during URL validation
#[derive(Debug, Error, PartialEq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be one of {expected}, got: {got}")]
    UnsupportedScheme { expected: String, got: String },

    #[error("URL must have a host")]
    MissingHost,
}

/// Parse `raw` and check its scheme is one of `schemes`.
pub fn validate_endpoint_url(raw: &str, schemes: &[&str]) -> Result<Url, UrlValidationError> {
    let url = Url::parse(raw.trim())?;

    if !schemes.contains(&url.scheme()) {
        return Err(UrlValidationError::UnsupportedScheme {
            expected: schemes.join(", "),
            got: url.scheme().to_string(),
        });
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

/// Validate an upstream realtime URL (`ws` or `wss`).
pub fn validate_websocket_url(raw: &str) -> Result<Url, UrlValidationError> {
    validate_endpoint_url(raw, WEBSOCKET_SCHEMES)
}

/// Validate a REST base URL (`http` or `https`).
pub fn validate_http_url(raw: &str) -> Result<Url, UrlValidationError> {
    validate_endpoint_url(raw, HTTP_SCHEMES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_urls() {
        assert!(validate_websocket_url("wss://api.openai.com/v1/realtime").is_ok());
        assert!(validate_websocket_url("ws://127.0.0.1:9000/rt").is_ok());

        let err = validate_websocket_url("https://api.openai.com/v1/realtime").unwrap_err();
        assert_eq!(
            err,
            UrlValidationError::UnsupportedScheme {
                expected: "ws, wss".to_string(),
                got: "https".to_string(),
            }
        );
    }

    #[test]
    fn test_http_urls() {
        let url = validate_http_url("  https://api.openai.com/v1  ").unwrap();
        assert_eq!(url.host_str(), Some("api.openai.com"));
        assert!(matches!(
            validate_http_url("ftp://files.example.com"),
            Err(UrlValidationError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_malformed_urls() {
        assert!(matches!(
            validate_http_url("not a url"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_websocket_url(""),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }
}
