//! The per-request validation pipeline.
//!
//! A request passes through three checks in a fixed order: path parameters,
//! then the query string, then the payload. The first part that fails is
//! handed to the [`FailurePolicy`] and the remaining parts are not looked at.
//! Only when every declared schema passes does the handler run, and it runs
//! with the normalized values, never the raw input.

use bytes::Bytes;
use kontakt_core::schema::validate;
use kontakt_core::{
    Constraint, FailurePolicy, InputSource, Reply, RequestContext, RouteSpec, ValidatedRequest,
    ValidationOutcome, Violation,
};
use kontakt_telemetry::record_validation_failure;
use serde_json::{Map, Value};

/// A request as it arrives from the transport, before any validation.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    params: Map<String, Value>,
    query: Option<String>,
    body: Bytes,
}

impl RawRequest {
    /// Creates a raw request from decoded path parameters, the undecoded
    /// query string and the body bytes.
    #[must_use]
    pub fn new(params: Map<String, Value>, query: Option<&str>, body: Bytes) -> Self {
        Self {
            params,
            query: query.map(ToString::to_string),
            body,
        }
    }

    /// Parses the query string into an object.
    ///
    /// Keys that repeat are collected into an array in order of appearance.
    fn query_value(&self) -> Result<Value, Violation> {
        let Some(raw) = self.query.as_deref().filter(|q| !q.is_empty()) else {
            return Ok(Value::Object(Map::new()));
        };

        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).map_err(|e| {
            Violation::new("", Constraint::Type, format!("query string is malformed: {e}"), None)
        })?;

        let mut object = Map::new();
        for (key, value) in pairs {
            match object.get_mut(&key) {
                None => {
                    object.insert(key, Value::String(value));
                }
                Some(Value::Array(values)) => values.push(Value::String(value)),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(value)]);
                }
            }
        }
        Ok(Value::Object(object))
    }

    /// The query as the handler sees it when the route declares no query
    /// schema: parsed when possible, otherwise the raw string.
    fn query_unchecked(&self) -> Value {
        self.query_value()
            .unwrap_or_else(|_| self.query.clone().map_or(Value::Null, Value::String))
    }

    /// Parses the body as JSON. An empty body is `null`.
    fn payload_value(&self) -> Result<Value, Violation> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            Violation::new("", Constraint::Json, format!("payload is not valid JSON: {e}"), None)
        })
    }

    /// The payload as the handler sees it when the route declares no
    /// payload schema: parsed JSON when possible, otherwise the body text.
    fn payload_unchecked(&self) -> Value {
        self.payload_value()
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&self.body).into_owned()))
    }
}

/// Runs the validation pipeline and the handler for a matched route.
///
/// The pipeline holds no per-request state; one instance serves every
/// request for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestPipeline {
    policy: FailurePolicy,
}

impl RequestPipeline {
    /// Creates a pipeline that reports failures through `policy`.
    #[must_use]
    pub const fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    /// Returns the failure policy.
    #[must_use]
    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Validates `raw` against `route` and, if every part passes, runs the
    /// route's handler.
    ///
    /// Handler errors are rendered through the failure policy, so this never
    /// fails: every outcome is a [`Reply`].
    pub async fn handle(&self, route: &RouteSpec, ctx: RequestContext, mut raw: RawRequest) -> Reply {
        let params = Value::Object(std::mem::take(&mut raw.params));
        let params = match self.check(&ctx, route, InputSource::Params, Ok(params)) {
            Ok(value) => value,
            Err(reply) => return reply,
        };
        let query = if route.query().is_some() {
            match self.check(&ctx, route, InputSource::Query, raw.query_value()) {
                Ok(value) => value,
                Err(reply) => return reply,
            }
        } else {
            raw.query_unchecked()
        };
        let payload = if route.payload().is_some() {
            match self.check(&ctx, route, InputSource::Payload, raw.payload_value()) {
                Ok(value) => value,
                Err(reply) => return reply,
            }
        } else {
            raw.payload_unchecked()
        };

        let request = ValidatedRequest::new(params, query, payload);
        match route.invoke(ctx.clone(), request).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    operation = route.operation_id(),
                    error = %error,
                    "handler returned an error"
                );
                self.policy.render_error(&ctx, &error)
            }
        }
    }

    fn check(
        &self,
        ctx: &RequestContext,
        route: &RouteSpec,
        source: InputSource,
        input: Result<Value, Violation>,
    ) -> Result<Value, Reply> {
        let outcome = match input {
            Ok(value) => validate(route.schema_for(source), &value),
            Err(violation) => ValidationOutcome::Invalid(vec![violation]),
        };

        match outcome {
            ValidationOutcome::Valid(value) => Ok(value),
            ValidationOutcome::Invalid(violations) => {
                for violation in &violations {
                    record_validation_failure(source.as_str(), violation.constraint.as_str());
                }
                Err(self.policy.on_validation_failure(ctx, source, &violations))
            }
        }
    }
}
