//! Errors surfaced by the PawsPort API client

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The API answered with a non-success status, or a simulated failure fired.
    #[error("{message} (Status: {status})")]
    Api { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// The injected update failure used to exercise rollback paths.
    pub fn simulated(failure_rate: f64) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Simulated server failure ({}% chance)", (failure_rate * 100.0).round()),
        )
    }

    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Text suitable for a user-facing notification.
    pub fn message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Build the error for a non-success response from its status and raw body.
    ///
    /// The body's `message` string wins; otherwise the status text is used.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status_text(status));
        Self::new(status, message)
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_json_body() {
        let err = ApiError::from_body(StatusCode::NOT_FOUND, r#"{"message":"Pet 9 not found"}"#);
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.message(), "Pet 9 not found");
    }

    #[test]
    fn test_status_text_fallback() {
        let err = ApiError::from_body(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(err.message(), "Bad Gateway");

        let err = ApiError::from_body(StatusCode::BAD_REQUEST, r#"{"message": 42}"#);
        assert_eq!(err.message(), "Bad Request");

        let err = ApiError::from_body(StatusCode::from_u16(599).unwrap(), "");
        assert_eq!(err.message(), "599");
    }

    #[test]
    fn test_simulated_failure() {
        let err = ApiError::simulated(0.3);
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.message(), "Simulated server failure (30% chance)");
    }
}
