//! Error types for Kontakt.
//!
//! [`ServiceError`] is the error type handlers return and the pipeline turns
//! into responses. Every variant has an [`ErrorCategory`] that maps to a
//! default HTTP status, and every error serializes to the same JSON envelope:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "VALIDATION_ERROR",
//!     "message": "invalid input: invalid query",
//!     "category": "validation",
//!     "details": { "source": "query", "violations": [] }
//!   },
//!   "request_id": "0192f5c4-..."
//! }
//! ```

use crate::schema::{InputSource, Violation};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error class, used for the envelope and the default status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A request part failed its schema.
    Validation,
    /// No route matches the request path.
    NotFound,
    /// The path exists but not for this method.
    MethodNotAllowed,
    /// Business-rule conflict, such as a duplicate contact.
    Conflict,
    /// Request or handler timeout.
    Timeout,
    /// Anything the client cannot fix.
    Internal,
}

impl ErrorCategory {
    /// Status used for errors of this class.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned by handlers and produced by routing.
///
/// # Example
///
/// ```
/// use kontakt_core::{ErrorCategory, ServiceError};
///
/// let error = ServiceError::conflict("This user already exists!");
/// assert_eq!(error.category(), ErrorCategory::Conflict);
/// assert_eq!(error.status_code().as_u16(), 409);
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad request input.
    #[error("invalid input: {message}")]
    Validation {
        /// Message.
        message: String,
        /// The request part that failed.
        part: Option<InputSource>,
        /// Field-level violations.
        violations: Vec<Violation>,
    },

    /// No route for the request path.
    #[error("not found: {message}")]
    NotFound {
        /// Message.
        message: String,
        /// The path that was requested.
        path: Option<String>,
    },

    /// Method not supported on a known path.
    #[error("method not allowed: {message}")]
    MethodNotAllowed {
        /// Message.
        message: String,
    },

    /// Conflict with existing state.
    #[error("conflict: {message}")]
    Conflict {
        /// Message.
        message: String,
    },

    /// The client did not send the request body in time.
    #[error("request timeout: {message}")]
    RequestTimeout {
        /// Message.
        message: String,
    },

    /// The handler did not finish in time.
    #[error("timed out: {message}")]
    Timeout {
        /// Message.
        message: String,
    },

    /// Unexpected failure.
    #[error("internal error: {message}")]
    Internal {
        /// Message.
        message: String,
        /// Cause, logged but never sent to the client.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ServiceError {
    /// A validation error for one request part.
    #[must_use]
    pub fn validation_failed(part: InputSource, violations: Vec<Violation>) -> Self {
        Self::Validation {
            message: format!("invalid {part}"),
            part: Some(part),
            violations,
        }
    }

    /// A 404 for a path no route matches.
    #[must_use]
    pub fn no_route(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::NotFound {
            message: format!("No route for '{path}'"),
            path: Some(path),
        }
    }

    /// A 405.
    #[must_use]
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            message: message.into(),
        }
    }

    /// A 409.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// A 408: the body did not arrive in time.
    #[must_use]
    pub fn request_timeout(message: impl Into<String>) -> Self {
        Self::RequestTimeout {
            message: message.into(),
        }
    }

    /// A 504: the handler did not finish in time.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// A 500.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// A 500 carrying its cause.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Error class.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::RequestTimeout { .. } | Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            _ => self.category().default_status_code(),
        }
    }

    /// Field violations, empty unless this is a validation error.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation { violations, .. } => violations,
            _ => &[],
        }
    }

    /// Builds the JSON envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                category: self.category(),
                details: self.details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

        fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Conflict { .. } => "CONFLICT",
            Self::RequestTimeout { .. } => "REQUEST_TIMEOUT",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation {
                part, violations, ..
            } if part.is_some() || !violations.is_empty() => Some(serde_json::json!({
                "source": part,
                "violations": violations,
            })),
            Self::NotFound {
                path: Some(path), ..
            } => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// What went wrong.
    pub error: ErrorDetail,
    /// Id of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// The `error` object of an [`ErrorEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable code, e.g. `NOT_FOUND`.
    pub code: String,
    /// Message for humans.
    pub message: String,
    /// Error class.
    pub category: ErrorCategory,
    /// Structured extras, such as violations or the unmatched path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Constraint;

    #[test]
    fn test_validation_failed_details() {
        let violation = Violation::new("text", Constraint::Required, "\"text\" is required", None);
        let error = ServiceError::validation_failed(InputSource::Query, vec![violation]);
        assert_eq!(error.violations().len(), 1);

        let envelope = error.to_envelope(Some("req-1"));
        let details = envelope.error.details.unwrap();
        assert_eq!(details["source"], "query");
        assert_eq!(details["violations"][0]["path"], "text");
        assert_eq!(details["violations"][0]["constraint"], "required");
    }

    #[test]
    fn test_no_route() {
        let error = ServiceError::no_route("/nope");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        let details = error.to_envelope(None).error.details.unwrap();
        assert_eq!(details["path"], "/nope");
    }

    #[test]
    fn test_timeouts() {
        assert_eq!(
            ServiceError::request_timeout("body").status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            ServiceError::timeout("handler").status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ServiceError::request_timeout("body").category(),
            ErrorCategory::Timeout
        );
    }

    #[test]
    fn test_internal_error_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = ServiceError::internal_with_source("Something went wrong", io);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_envelope_omits_empty_details() {
        let error = ServiceError::method_not_allowed("DELETE /contacts");
        let envelope = error.to_envelope(Some("req-9"));

        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"code\":\"METHOD_NOT_ALLOWED\""));
        assert!(json.contains("\"request_id\":\"req-9\""));
        assert!(json.contains("\"category\":\"method_not_allowed\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_every_category_maps_to_an_error_status() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::NotFound,
            ErrorCategory::MethodNotAllowed,
            ErrorCategory::Conflict,
            ErrorCategory::Timeout,
            ErrorCategory::Internal,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "{category:?} -> {status}"
            );
        }
    }
}
