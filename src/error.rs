//! Error types for CircleCI API operations.

use serde::Deserialize;
use serde_with::{serde_as, DefaultOnNull};
use thiserror::Error;

/// An error reported by the CircleCI API.
///
/// Produced for every response with a status code of 300 or above, whatever
/// the shape of the body. The message is taken from the `message` field of a
/// JSON error body; it is empty when the API sent no body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status_code}: {message}")]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status_code: u16,
    /// Human-readable message.
    pub message: String,
}

/// Error body returned by the API, e.g. `{"message": "Project not found"}`.
///
/// A missing or `null` message decodes as empty.
#[serde_as]
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Message")]
    message: String,
}

impl ApiError {
    /// Create an error from a status code and message.
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Build an error from the raw body of a failed response.
    pub fn from_body(status_code: u16, body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::new(status_code, "");
        }

        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => Self::new(status_code, parsed.message),
            Err(err) => Self::new(
                status_code,
                format!("unable to parse API response: {err}"),
            ),
        }
    }

    /// Build an error for a failed response whose body could not be read.
    pub fn unreadable(status_code: u16, cause: impl std::fmt::Display) -> Self {
        Self::new(status_code, format!("unable to parse response: {cause}"))
    }
}

/// Errors that can occur during CircleCI API operations.
#[derive(Debug, Error)]
pub enum CircleError {
    /// Configuration is missing or incomplete.
    #[error("CircleCI configuration required: {0}")]
    ConfigMissing(String),

    /// A query is missing a required coordinate.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Artifact path would land outside the destination directory.
    #[error("Invalid artifact path '{0}': must stay inside the destination directory")]
    InvalidArtifactPath(String),

    /// The API answered with a status of 300 or above.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Filesystem error while writing an artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CircleError {
    /// The API error, if this failure came from an API response.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for CircleCI operations.
pub type Result<T> = core::result::Result<T, CircleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(404, "Project not found");
        assert_eq!(err.to_string(), "404: Project not found");
    }

    #[test]
    fn test_from_body_with_message() {
        let err = ApiError::from_body(404, br#"{"message":"not found"}"#);
        assert_eq!(err, ApiError::new(404, "not found"));
    }

    #[test]
    fn test_from_body_empty() {
        let err = ApiError::from_body(500, b"");
        assert_eq!(err, ApiError::new(500, ""));
    }

    #[test]
    fn test_from_body_without_message_field() {
        let err = ApiError::from_body(400, br#"{"error":"bad"}"#);
        assert_eq!(err, ApiError::new(400, ""));
    }

    #[test]
    fn test_from_body_null_message() {
        let err = ApiError::from_body(404, br#"{"message":null}"#);
        assert_eq!(err, ApiError::new(404, ""));
    }

    #[test]
    fn test_from_body_capitalized_message_key() {
        let err = ApiError::from_body(403, br#"{"Message":"Permission denied"}"#);
        assert_eq!(err, ApiError::new(403, "Permission denied"));
    }

    #[test]
    fn test_from_body_not_json() {
        let err = ApiError::from_body(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.status_code, 502);
        assert!(err.message.starts_with("unable to parse API response: "));
    }

    #[test]
    fn test_from_body_wrong_message_type() {
        let err = ApiError::from_body(422, br#"{"message": 12}"#);
        assert!(err.message.starts_with("unable to parse API response: "));
    }

    #[test]
    fn test_unreadable() {
        let err = ApiError::unreadable(503, "connection reset");
        assert_eq!(err.message, "unable to parse response: connection reset");
    }

    #[test]
    fn test_api_variant_is_transparent() {
        let err = CircleError::from(ApiError::new(401, "You must log in first."));
        assert_eq!(err.to_string(), "401: You must log in first.");
        assert_eq!(err.as_api_error().map(|e| e.status_code), Some(401));
    }
}
