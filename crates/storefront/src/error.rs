//! Transport-level error taxonomy for backend calls.
//!
//! Every backend call is wrapped at the call site; nothing here is fatal to
//! the session. Each operation decides locally whether a failure is
//! informational or blocking, and no automatic retry happens anywhere - the
//! user re-triggers the action.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the Bazaar backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response at all. The backend is down or the base URL is wrong.
    #[error(
        "backend unreachable: {0}. Check that the backend is running and BAZAAR_API_URL points at it"
    )]
    Unreachable(#[source] reqwest::Error),

    /// 409 - the requested mutation duplicates existing state. Non-fatal.
    #[error("conflict: {0}")]
    Conflict(String),

    /// 400 - a precondition failed (e.g. empty cart at checkout).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 401 - missing or rejected credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 404 - resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Fallback bucket for any other non-success status.
    #[error("server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Classify a non-success response, extracting the backend's message
    /// from its `{"error": "..."}` body shape when present, falling back to
    /// the status text.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = message_from_body(body, status);
        match status {
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::BAD_REQUEST => Self::BadRequest(message),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Map a reqwest failure. Anything that prevented a response counts as
    /// unreachable; there is no client-side retry.
    #[must_use]
    pub fn transport(err: reqwest::Error) -> Self {
        Self::Unreachable(err)
    }

    /// Whether this is a 409 duplicate-state signal.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether this is a 400 precondition failure.
    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }

    /// Whether this is a 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether no response was received at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Extract the `error` field from a backend error body, falling back to the
/// HTTP status text.
fn message_from_body(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(serde_json::Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_extracted_from_error_body() {
        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"error":"Item already in cart"}"#);
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "conflict: Item already in cart");
    }

    #[test]
    fn test_message_falls_back_to_status_text() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "not json at all");
        assert!(err.is_bad_request());
        assert_eq!(err.to_string(), "bad request: Bad Request");
    }

    #[test]
    fn test_unhandled_status_goes_to_fallback_bucket() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"boom"}"#,
        );
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.to_string(), "server error (500): boom");
    }

    #[test]
    fn test_unauthorized_classification() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"Invalid username or password"}"#,
        );
        assert_eq!(err.to_string(), "unauthorized: Invalid username or password");
    }
}
