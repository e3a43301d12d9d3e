// src/error.rs
// Error types for the Firebase query engine

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum FirebaseError {
    #[error("Firebase client not initialized: {0} handle missing")]
    NotInitialized(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using FirebaseError
pub type Result<T> = std::result::Result<T, FirebaseError>;

/// Coarse error classes callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A store handle was requested before initialization
    Precondition,
    /// The caller supplied a filter the boundary could not accept
    MalformedInput,
    /// The store (or the path to it) failed
    Store,
}

impl FirebaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized(_) => ErrorKind::Precondition,
            Self::InvalidInput(_) => ErrorKind::MalformedInput,
            Self::Auth(_)
            | Self::NotFound(_)
            | Self::Api { .. }
            | Self::Http(_)
            | Self::Io(_)
            | Self::Decode(_)
            | Self::Config(_) => ErrorKind::Store,
        }
    }

    /// Convert to user-facing string for MCP tool boundaries
    pub fn to_user_string(&self) -> String {
        self.to_string()
    }

    /// Map a non-success HTTP status from Google APIs onto the taxonomy.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = extract_api_message(body).unwrap_or_else(|| body.trim().to_string());
        match status.as_u16() {
            401 | 403 => Self::Auth(message),
            404 => Self::NotFound(message),
            code => Self::Api {
                status: code,
                message,
            },
        }
    }
}

/// Google APIs wrap errors as `{"error": {"message": ...}}`; Firestore's
/// runQuery sometimes wraps that again in a one-element array.
fn extract_api_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = match &value {
        serde_json::Value::Array(items) => items.first()?.get("error")?,
        other => other.get("error")?,
    };
    match error {
        serde_json::Value::String(s) => Some(s.clone()),
        other => other
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_not_initialized_is_precondition() {
        let err = FirebaseError::NotInitialized("document store");
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(err.to_string().contains("not initialized"));
        assert!(err.to_string().contains("document store"));
    }

    #[test]
    fn test_invalid_input_is_malformed() {
        let err = FirebaseError::InvalidInput("filter must be an object".to_string());
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("filter must be an object"));
    }

    #[test]
    fn test_store_kinds() {
        assert_eq!(FirebaseError::Auth("x".into()).kind(), ErrorKind::Store);
        assert_eq!(FirebaseError::NotFound("x".into()).kind(), ErrorKind::Store);
        assert_eq!(FirebaseError::Decode("x".into()).kind(), ErrorKind::Store);
        let api = FirebaseError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(api.kind(), ErrorKind::Store);
        assert!(api.to_string().contains("500"));
        assert!(api.to_string().contains("boom"));
    }

    #[test]
    fn test_from_status_extracts_google_message() {
        let body = r#"{"error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}}"#;
        let err = FirebaseError::from_status(StatusCode::FORBIDDEN, body);
        assert!(matches!(err, FirebaseError::Auth(_)));
        assert!(err.to_string().contains("Missing or insufficient permissions."));
    }

    #[test]
    fn test_from_status_array_wrapped() {
        let body = r#"[{"error": {"code": 400, "message": "no matching index"}}]"#;
        let err = FirebaseError::from_status(StatusCode::BAD_REQUEST, body);
        match err {
            FirebaseError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "no matching index");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_from_status_token_endpoint_shape() {
        let body = r#"{"error": "invalid_grant", "error_description": "bad jwt"}"#;
        let err = FirebaseError::from_status(StatusCode::BAD_REQUEST, body);
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn test_from_status_not_found_plain_body() {
        let err = FirebaseError::from_status(StatusCode::NOT_FOUND, "  The bucket does not exist.\n");
        assert!(matches!(err, FirebaseError::NotFound(ref m) if m == "The bucket does not exist."));
    }
}
