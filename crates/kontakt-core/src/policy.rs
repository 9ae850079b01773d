//! Deployment mode and the failure policy.
//!
//! The mode is resolved once at startup and decides how much of a failure
//! the client gets to see. In production, a validation failure becomes a
//! fixed 400 message and the detail stays in the server log; in development
//! the full violation list is returned.

use crate::context::RequestContext;
use crate::error::{ErrorCategory, ErrorDetail, ErrorEnvelope, ServiceError};
use crate::reply::{Reply, ReplyBody};
use crate::schema::{InputSource, Violation};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Message returned for every validation failure in production.
pub const GENERIC_BAD_REQUEST_MESSAGE: &str = "invalid request input";

const GENERIC_INTERNAL_MESSAGE: &str = "internal server error";

/// Deployment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Client-visible errors are generic.
    Production,
    /// Client-visible errors carry full detail.
    #[default]
    Development,
}

impl DeploymentMode {
    /// Resolves the mode from a raw environment value.
    ///
    /// Only the exact value `production` selects production; anything else,
    /// including an unset variable, is development.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            _ => Self::Development,
        }
    }

    /// Returns `true` in production.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Returns the lowercase mode name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            other => Err(format!(
                "unknown environment '{other}', expected 'production' or 'development'"
            )),
        }
    }
}

/// Maps failures to client-visible replies according to the deployment mode.
///
/// # Example
///
/// ```
/// use kontakt_core::{FailurePolicy, InputSource, RequestContext, Violation, Constraint};
///
/// let policy = FailurePolicy::production();
/// let violation = Violation::new("name", Constraint::MinLength, "too short", None);
/// let reply = policy.on_validation_failure(&RequestContext::new(), InputSource::Params, &[violation]);
/// assert_eq!(reply.status().as_u16(), 400);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailurePolicy {
    mode: DeploymentMode,
}

impl FailurePolicy {
    /// Creates a policy for a mode.
    #[must_use]
    pub const fn new(mode: DeploymentMode) -> Self {
        Self { mode }
    }

    /// A production policy.
    #[must_use]
    pub const fn production() -> Self {
        Self::new(DeploymentMode::Production)
    }

    /// A development policy.
    #[must_use]
    pub const fn development() -> Self {
        Self::new(DeploymentMode::Development)
    }

    /// Returns the mode.
    #[must_use]
    pub const fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// Builds the 400 reply for a failed schema and logs the detail.
    #[must_use]
    pub fn on_validation_failure(
        &self,
        ctx: &RequestContext,
        source: InputSource,
        violations: &[Violation],
    ) -> Reply {
        let request_id = ctx.request_id().to_string();

        match self.mode {
            DeploymentMode::Production => {
                let fields = violations
                    .iter()
                    .map(|v| format!("{}:{}", v.path, v.constraint))
                    .collect::<Vec<_>>()
                    .join(",");
                tracing::info!(
                    request_id = %request_id,
                    operation = ctx.operation_id().unwrap_or("-"),
                    source = %source,
                    violations = violations.len(),
                    fields = %fields,
                    "request rejected by schema"
                );

                let envelope = ErrorEnvelope {
                    error: ErrorDetail {
                        code: "BAD_REQUEST".to_string(),
                        message: GENERIC_BAD_REQUEST_MESSAGE.to_string(),
                        category: ErrorCategory::Validation,
                        details: None,
                    },
                    request_id: Some(request_id),
                };
                let body = serde_json::to_value(&envelope).unwrap_or(serde_json::Value::Null);
                Reply::new(StatusCode::BAD_REQUEST, ReplyBody::Json(body))
            }
            DeploymentMode::Development => {
                let detail = serde_json::to_string(violations).unwrap_or_default();
                tracing::info!(
                    request_id = %request_id,
                    operation = ctx.operation_id().unwrap_or("-"),
                    source = %source,
                    violations = %detail,
                    "request rejected by schema"
                );

                let error = ServiceError::validation_failed(source, violations.to_vec());
                Reply::error(&error, Some(&request_id))
            }
        }
    }

    /// Renders a handler or routing error as an envelope reply.
    ///
    /// Internal error messages are replaced by a generic one in production.
    #[must_use]
    pub fn render_error(&self, ctx: &RequestContext, error: &ServiceError) -> Reply {
        let request_id = ctx.request_id().to_string();

        if let ServiceError::Internal { message, source } = error {
            tracing::error!(
                request_id = %request_id,
                operation = ctx.operation_id().unwrap_or("-"),
                error = %message,
                source = ?source,
                "handler failed"
            );
            if self.mode.is_production() {
                return Reply::error(&ServiceError::internal(GENERIC_INTERNAL_MESSAGE), Some(&request_id));
            }
        }

        Reply::error(error, Some(&request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Constraint;
    use serde_json::{json, Value};

    fn violation() -> Violation {
        Violation::new(
            "name",
            Constraint::MinLength,
            "\"name\" length must be at least 3 characters long",
            Some(json!("ab")),
        )
    }

    fn body(reply: &Reply) -> Value {
        match reply.body() {
            ReplyBody::Json(value) => value.clone(),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_mode_from_env_value() {
        assert_eq!(DeploymentMode::from_env_value(Some("production")), DeploymentMode::Production);
        assert_eq!(DeploymentMode::from_env_value(Some("Production")), DeploymentMode::Development);
        assert_eq!(DeploymentMode::from_env_value(Some("staging")), DeploymentMode::Development);
        assert_eq!(DeploymentMode::from_env_value(None), DeploymentMode::Development);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("production".parse::<DeploymentMode>(), Ok(DeploymentMode::Production));
        assert_eq!("development".parse::<DeploymentMode>(), Ok(DeploymentMode::Development));
        assert!("prod".parse::<DeploymentMode>().is_err());
    }

    #[test]
    fn test_production_hides_violation_detail() {
        let policy = FailurePolicy::production();
        let reply = policy.on_validation_failure(&RequestContext::new(), InputSource::Params, &[violation()]);

        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
        let body = body(&reply);
        assert_eq!(body["error"]["message"], GENERIC_BAD_REQUEST_MESSAGE);
        assert!(body["error"].get("details").is_none());

        let text = body.to_string();
        assert!(!text.contains("min_length"));
        assert!(!text.contains("\"ab\""));
        assert!(!text.contains("name"));
    }

    #[test]
    fn test_development_returns_violation_detail() {
        let policy = FailurePolicy::development();
        let reply = policy.on_validation_failure(&RequestContext::new(), InputSource::Params, &[violation()]);

        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
        let body = body(&reply);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["source"], "params");
        assert_eq!(body["error"]["details"]["violations"][0]["constraint"], "min_length");
        assert_eq!(body["error"]["details"]["violations"][0]["value"], "ab");
    }

    #[test]
    fn test_render_error_redacts_internal_in_production() {
        let error = ServiceError::internal("db password is hunter2");

        let reply = FailurePolicy::production().render_error(&RequestContext::new(), &error);
        assert_eq!(reply.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body(&reply).to_string().contains("hunter2"));

        let reply = FailurePolicy::development().render_error(&RequestContext::new(), &error);
        assert!(body(&reply).to_string().contains("hunter2"));
    }

    #[test]
    fn test_render_error_keeps_client_errors() {
        let error = ServiceError::no_route("/missing");
        let reply = FailurePolicy::production().render_error(&RequestContext::new(), &error);
        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&reply)["error"]["code"], "NOT_FOUND");
    }
}
