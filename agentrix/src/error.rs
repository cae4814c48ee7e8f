//! Error types for the Agentrix SDK.
//!
//! Every failure surfaced by the SDK is an [`AgentrixError`], which is one of
//! three kinds:
//!
//! - [`ValidationError`] - the caller supplied bad input; no request was sent.
//! - [`ApiError`] - the server (or the transport on the way to it) failed.
//! - [`GenericError`] - anything else, e.g. an undecodable response body.
//!
//! Transport errors from `reqwest`, `serde_json` and `url` convert into one of
//! these kinds through `From`, so `?` never leaks a raw transport error.

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;

/// Machine-readable code of every [`ValidationError`].
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// Default code of an [`ApiError`] without a server-supplied code.
pub const API_ERROR: &str = "API_ERROR";

/// Default code of a [`GenericError`] built from an unrecognized failure.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Convenience alias used throughout the SDK.
pub type Result<T, E = AgentrixError> = std::result::Result<T, E>;

/// Base error type for Agentrix SDK operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentrixError {
    /// Caller input was rejected before any network I/O.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The API responded with a failure, or could not be reached.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Any other failure.
    #[error("{0}")]
    Generic(#[from] GenericError),
}

impl AgentrixError {
    /// Machine-readable error code (e.g. `VALIDATION_ERROR`).
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Validation(_) => VALIDATION_ERROR,
            Self::Api(err) => &err.code,
            Self::Generic(err) => &err.code,
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(err) => &err.message,
            Self::Api(err) => &err.message,
            Self::Generic(err) => &err.message,
        }
    }

    /// HTTP status of the failed response, if the failure came from one.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(err) => err.status_code,
            Self::Validation(_) | Self::Generic(_) => None,
        }
    }

    /// Structured details, when the server or the SDK supplied any.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        match self {
            Self::Validation(err) => err.details.as_ref(),
            Self::Api(err) => err.details.as_ref(),
            Self::Generic(err) => err.details.as_ref(),
        }
    }

    /// Returns `true` for [`AgentrixError::Validation`].
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` for [`AgentrixError::Api`].
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

/// Caller input failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Human-readable message naming the offending field.
    pub message: String,
    /// Optional structured context.
    pub details: Option<Value>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{VALIDATION_ERROR}: {}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The API could not be reached or answered with a non-success status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Server-supplied code, or [`API_ERROR`].
    pub code: String,
    /// Server-supplied message, or the transport error text.
    pub message: String,
    /// HTTP status, absent for connect and timeout failures.
    pub status_code: Option<u16>,
    /// Server-supplied details.
    pub details: Option<Value>,
}

impl ApiError {
    /// Creates a new API error with code [`API_ERROR`].
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: API_ERROR.to_owned(),
            message: message.into(),
            status_code: None,
            details: None,
        }
    }

    /// Overrides the error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Builds an error from a non-success response.
    ///
    /// When `body` is JSON carrying an `error` object, its `code`, `message`
    /// and `details` fields win over the defaults. `fallback_message` is the
    /// transport's own description of the failure. A JSON body of any other
    /// shape is kept as `details`.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &[u8], fallback_message: &str) -> Self {
        let base = Self::new(fallback_message).with_status(status.as_u16());
        let Ok(parsed) = serde_json::from_slice::<Value>(body) else {
            return base;
        };
        match parsed.get("error") {
            Some(Value::Object(error)) => {
                let code = error
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or(API_ERROR);
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or(fallback_message);
                Self {
                    code: code.to_owned(),
                    message: message.to_owned(),
                    status_code: Some(status.as_u16()),
                    details: error.get("details").filter(|d| !d.is_null()).cloned(),
                }
            }
            _ => base.with_details(parsed),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(status) => write!(f, "{} ({status}): {}", self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// A failure that is neither a validation nor an API error.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericError {
    /// Machine-readable code, [`UNKNOWN_ERROR`] unless set.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured context.
    pub details: Option<Value>,
}

impl GenericError {
    /// Creates an error with code [`UNKNOWN_ERROR`].
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(UNKNOWN_ERROR, message)
    }

    /// Creates an error with an explicit code.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for GenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GenericError {}

impl From<reqwest::Error> for AgentrixError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return GenericError::unknown(err.to_string()).into();
        }
        let api = ApiError::new(err.to_string());
        match err.status() {
            Some(status) => api.with_status(status.as_u16()).into(),
            None => api.into(),
        }
    }
}

impl From<serde_json::Error> for AgentrixError {
    fn from(err: serde_json::Error) -> Self {
        GenericError::unknown(err.to_string()).into()
    }
}

impl From<url::ParseError> for AgentrixError {
    fn from(err: url::ParseError) -> Self {
        GenericError::new("INVALID_URL", err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_uses_server_error_object() {
        let body = json!({
            "error": {
                "code": "INSUFFICIENT_FUNDS",
                "message": "Balance too low",
                "details": { "available": 3 }
            }
        });
        let err = ApiError::from_response(
            StatusCode::PAYMENT_REQUIRED,
            body.to_string().as_bytes(),
            "HTTP status client error (402 Payment Required)",
        );
        assert_eq!(err.code, "INSUFFICIENT_FUNDS");
        assert_eq!(err.message, "Balance too low");
        assert_eq!(err.status_code, Some(402));
        assert_eq!(err.details, Some(json!({ "available": 3 })));
    }

    #[test]
    fn test_api_error_defaults_missing_fields() {
        let body = json!({ "error": { "details": null } });
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            body.to_string().as_bytes(),
            "bad request",
        );
        assert_eq!(err.code, API_ERROR);
        assert_eq!(err.message, "bad request");
        assert_eq!(err.details, None);
    }

    #[test]
    fn test_api_error_falls_back_for_non_json_body() {
        let err = ApiError::from_response(
            StatusCode::BAD_GATEWAY,
            b"<html>upstream down</html>",
            "HTTP status server error (502 Bad Gateway)",
        );
        assert_eq!(err.code, API_ERROR);
        assert_eq!(err.message, "HTTP status server error (502 Bad Gateway)");
        assert_eq!(err.status_code, Some(502));
        assert!(err.details.is_none());
    }

    #[test]
    fn test_api_error_keeps_other_json_as_details() {
        let body = json!({ "statusCode": 404, "message": "Not Found", "error": "Not Found" });
        let err = ApiError::from_response(StatusCode::NOT_FOUND, body.to_string().as_bytes(), "404");
        assert_eq!(err.code, API_ERROR);
        assert_eq!(err.message, "404");
        assert_eq!(err.details, Some(body));
    }

    #[test]
    fn test_accessors_per_kind() {
        let validation: AgentrixError = ValidationError::new("Amount must be positive").into();
        assert_eq!(validation.code(), VALIDATION_ERROR);
        assert!(validation.is_validation());
        assert_eq!(validation.status_code(), None);

        let api: AgentrixError = ApiError::new("boom").with_status(500).into();
        assert_eq!(api.code(), API_ERROR);
        assert_eq!(api.status_code(), Some(500));
        assert!(api.is_api());

        let generic: AgentrixError = GenericError::unknown("weird").into();
        assert_eq!(generic.code(), UNKNOWN_ERROR);
        assert_eq!(generic.message(), "weird");
    }

    #[test]
    fn test_json_error_becomes_unknown() {
        let parse_err = serde_json::from_str::<Value>("{").unwrap_err();
        let err = AgentrixError::from(parse_err);
        assert_eq!(err.code(), UNKNOWN_ERROR);
    }
}
