//! The normalized error type every failure path converges to.
//!
//! The upstream API reports failures in several shapes (bare string bodies,
//! `{message}`, `{error: {message, code}}`, `{errors: [{detail, code}]}`), and
//! transports add their own failure classes on top (no response, blocked by a
//! browser CORS policy, request never dispatched). [`ApiError`] is the single
//! structured representation all of them normalize into before reaching a
//! caller.

use serde_json::Value;
use thiserror::Error;

use crate::env::EnvironmentProfile;

/// Errors surfaced by any ZerionKit operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad configuration or arguments, raised before any network activity.
    #[error("validation error: {0}")]
    Validation(String),

    /// The server responded with an error status.
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        /// Server-supplied error code, when one was present in the body.
        code: Option<String>,
        message: String,
        /// The raw error body, kept for debugging.
        details: Option<Value>,
    },

    /// The request went out but no response ever came back.
    #[error("network error: {0}")]
    Network(String),

    /// A browser CORS policy blocked the request. Never retryable.
    #[error("CORS error: {0}")]
    Cors(String),

    /// The request could not even be constructed or sent.
    #[error("request setup error: {0}")]
    Request(String),

    /// Anything that fits no other class.
    #[error("{0}")]
    Unknown(String),
}

/// A transport failure that produced no HTTP response, described in
/// transport-neutral terms so the classifier stays free of HTTP-library types.
#[derive(Debug, Clone)]
pub enum SendFailure {
    /// The request never left the client (builder error, invalid URL, ...).
    NotDispatched(String),
    /// The request was sent but no response was received.
    NoResponse(String),
}

impl ApiError {
    /// Normalize a response that came back with an error status.
    ///
    /// Message extraction tries, in priority order: a bare string body,
    /// `message`, `error.message`, `errors[0].detail`. Codes are extracted
    /// from `code`, `error.code`, `errors[0].code`.
    pub fn from_error_response(status: u16, body: &str) -> Self {
        let details: Option<Value> = serde_json::from_str(body).ok();

        let (message, code) = match &details {
            Some(value) => (extract_message(value), extract_code(value)),
            None if !body.trim().is_empty() => (Some(body.trim().to_string()), None),
            None => (None, None),
        };

        Self::Api {
            status,
            code,
            message: message.unwrap_or_else(|| format!("Request failed with status {status}")),
            details,
        }
    }

    /// Normalize a failure that produced no response at all.
    ///
    /// Browser-profile failures matching the CORS heuristic become
    /// [`ApiError::Cors`] — retrying those can never succeed, so they must be
    /// distinguishable from plain network failures. Everything else keeps
    /// environment-aware wording.
    pub fn from_send_failure(profile: &EnvironmentProfile, failure: SendFailure) -> Self {
        match failure {
            SendFailure::NotDispatched(message) => Self::Request(message),
            SendFailure::NoResponse(message) => {
                if profile.is_browser && looks_like_cors(&message) {
                    Self::Cors(format!(
                        "request blocked by the browser CORS policy ({message}); \
                         proxy API calls through a backend instead of calling directly"
                    ))
                } else if profile.is_browser {
                    Self::Network(format!(
                        "no response received ({message}); check connectivity and CORS configuration"
                    ))
                } else {
                    Self::Network(format!("no response received ({message}); check connectivity"))
                }
            }
        }
    }

    /// Catch-all for non-protocol failures (poisoned state, joins, ...).
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// Symbolic error code for this failure class, or the server-supplied
    /// code for protocol errors when one was present.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Validation(_) => Some("VALIDATION_ERROR"),
            Self::Api { code, .. } => code.as_deref(),
            Self::Network(_) => Some("NETWORK_ERROR"),
            Self::Cors(_) => Some("CORS_ERROR"),
            Self::Request(_) => Some("REQUEST_ERROR"),
            Self::Unknown(_) => Some("UNKNOWN_ERROR"),
        }
    }

    /// The upstream HTTP status, if the server responded at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this error is transient and worth retrying.
    ///
    /// Retryable: responseless network failures (excluding CORS) and
    /// statuses `>= 500`, `429`, `408`.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            _ => false,
        }
    }
}

fn extract_message(value: &Value) -> Option<String> {
    if let Some(s) = value.as_str() {
        return Some(s.to_string());
    }
    value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| value.pointer("/error/message").and_then(Value::as_str))
        .or_else(|| value.pointer("/errors/0/detail").and_then(Value::as_str))
        .map(str::to_string)
}

fn extract_code(value: &Value) -> Option<String> {
    value
        .get("code")
        .and_then(Value::as_str)
        .or_else(|| value.pointer("/error/code").and_then(Value::as_str))
        .or_else(|| value.pointer("/errors/0/code").and_then(Value::as_str))
        .map(str::to_string)
}

fn looks_like_cors(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("cors")
        || lower.contains("cross-origin")
        || lower.contains("access-control-allow-origin")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::RuntimeKind;
    use serde_json::json;

    #[test]
    fn extracts_message_from_all_body_shapes() {
        let bare = ApiError::from_error_response(400, "\"bad request\"");
        assert!(matches!(&bare, ApiError::Api { message, .. } if message == "bad request"));

        let flat = ApiError::from_error_response(400, &json!({"message": "flat"}).to_string());
        assert!(matches!(&flat, ApiError::Api { message, .. } if message == "flat"));

        let nested = ApiError::from_error_response(
            401,
            &json!({"error": {"message": "nested", "code": "unauthorized"}}).to_string(),
        );
        match &nested {
            ApiError::Api { message, code, status, .. } => {
                assert_eq!(message, "nested");
                assert_eq!(code.as_deref(), Some("unauthorized"));
                assert_eq!(*status, 401);
            }
            other => panic!("expected Api error, got {other:?}"),
        }

        let listed = ApiError::from_error_response(
            422,
            &json!({"errors": [{"detail": "listed", "code": "invalid"}]}).to_string(),
        );
        match &listed {
            ApiError::Api { message, code, .. } => {
                assert_eq!(message, "listed");
                assert_eq!(code.as_deref(), Some("invalid"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_becomes_the_message() {
        let err = ApiError::from_error_response(502, "upstream exploded");
        assert!(matches!(&err, ApiError::Api { message, details: None, .. }
            if message == "upstream exploded"));
    }

    #[test]
    fn empty_body_falls_back_to_status_message() {
        let err = ApiError::from_error_response(404, "");
        assert!(matches!(&err, ApiError::Api { message, .. }
            if message == "Request failed with status 404"));
        assert_eq!(err.http_status(), Some(404));
    }

    #[test]
    fn cors_heuristic_only_applies_in_browser_profiles() {
        let browser = EnvironmentProfile::from_kind(RuntimeKind::Browser);
        let server = EnvironmentProfile::from_kind(RuntimeKind::Server);
        let failure = || SendFailure::NoResponse("blocked by CORS policy".into());

        assert!(matches!(
            ApiError::from_send_failure(&browser, failure()),
            ApiError::Cors(_)
        ));
        assert!(matches!(
            ApiError::from_send_failure(&server, failure()),
            ApiError::Network(_)
        ));
    }

    #[test]
    fn setup_failures_map_to_request_error() {
        let server = EnvironmentProfile::from_kind(RuntimeKind::Server);
        let err = ApiError::from_send_failure(
            &server,
            SendFailure::NotDispatched("relative URL without a base".into()),
        );
        assert!(matches!(err, ApiError::Request(_)));
        assert_eq!(err.code(), Some("REQUEST_ERROR"));
    }

    #[test]
    fn retryability_per_failure_class() {
        assert!(ApiError::Network("gone".into()).is_retryable());
        assert!(ApiError::from_error_response(503, "").is_retryable());
        assert!(ApiError::from_error_response(429, "").is_retryable());
        assert!(ApiError::from_error_response(408, "").is_retryable());
        assert!(!ApiError::from_error_response(404, "").is_retryable());
        assert!(!ApiError::Cors("blocked".into()).is_retryable());
        assert!(!ApiError::Validation("bad key".into()).is_retryable());
        assert!(!ApiError::Request("builder".into()).is_retryable());
    }
}
