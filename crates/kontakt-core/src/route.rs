//! Route declarations.
//!
//! A [`RouteSpec`] ties a method and path template to the schemas for each
//! part of the request and to the handler that runs once all of them pass.
//! Handlers are type-erased so routes with different handler functions can
//! live in one table.

use crate::context::RequestContext;
use crate::error::ServiceError;
use crate::reply::Reply;
use crate::schema::{InputSource, ValidationSchema};
use http::{Method, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler returns.
pub type HandlerResult = Result<Reply, ServiceError>;

/// Type-erased route handler.
pub type Handler =
    Arc<dyn Fn(RequestContext, ValidatedRequest) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// The normalized request parts a handler receives.
///
/// Every part has already passed its route schema; defaults are applied and
/// scalars coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    params: Value,
    query: Value,
    payload: Value,
}

impl ValidatedRequest {
    /// Creates a validated request from normalized parts.
    #[must_use]
    pub const fn new(params: Value, query: Value, payload: Value) -> Self {
        Self {
            params,
            query,
            payload,
        }
    }

    /// Normalized path parameters (an object).
    #[must_use]
    pub const fn params(&self) -> &Value {
        &self.params
    }

    /// Normalized query parameters (an object).
    #[must_use]
    pub const fn query(&self) -> &Value {
        &self.query
    }

    /// Normalized request body (`null` when there was none).
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns a path parameter as a string.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    /// Consumes the request and returns the body.
    #[must_use]
    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// Consumes the request and returns the query.
    #[must_use]
    pub fn into_query(self) -> Value {
        self.query
    }
}

/// Documented response body shape.
#[derive(Debug, Clone)]
pub enum ResponseContent {
    /// No body.
    None,
    /// A `text/plain` body.
    Text,
    /// An `application/json` body, optionally described by a schema.
    Json(Option<ValidationSchema>),
}

/// A documented response of a route.
#[derive(Debug, Clone)]
pub struct ResponseDoc {
    /// Status code.
    pub status: StatusCode,
    /// Human-readable description.
    pub description: String,
    /// Body shape.
    pub content: ResponseContent,
}

impl ResponseDoc {
    /// Creates a response doc.
    #[must_use]
    pub fn new(status: StatusCode, description: impl Into<String>, content: ResponseContent) -> Self {
        Self {
            status,
            description: description.into(),
            content,
        }
    }
}

/// Method, path template, schemas and handler for one route.
///
/// Path templates use `{name}` for a parameter and `{name?}` for an optional
/// trailing parameter.
///
/// # Example
///
/// ```
/// use http::Method;
/// use kontakt_core::{FieldSchema, HandlerResult, Reply, RouteSpec, ValidationSchema};
///
/// let route = RouteSpec::new(Method::GET, "/search", "search", |_ctx, req| async move {
///     HandlerResult::Ok(Reply::json(req.into_query()))
/// })
/// .query_schema(ValidationSchema::new().field("text", FieldSchema::string().required()));
///
/// assert_eq!(route.operation_id(), "search");
/// assert!(route.query().is_some());
/// ```
#[derive(Clone)]
pub struct RouteSpec {
    method: Method,
    path: String,
    operation_id: String,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    params: Option<ValidationSchema>,
    query: Option<ValidationSchema>,
    payload: Option<ValidationSchema>,
    responses: Vec<ResponseDoc>,
    handler: Handler,
}

impl RouteSpec {
    /// Creates a route with no schemas.
    pub fn new<F, Fut>(
        method: Method,
        path: impl Into<String>,
        operation_id: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(RequestContext, ValidatedRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler: Handler = Arc::new(
            move |ctx, req| -> BoxFuture<'static, HandlerResult> { Box::pin(handler(ctx, req)) },
        );
        Self {
            method,
            path: path.into(),
            operation_id: operation_id.into(),
            summary: None,
            description: None,
            tags: Vec::new(),
            params: None,
            query: None,
            payload: None,
            responses: Vec::new(),
            handler,
        }
    }

    /// Sets the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the path parameter schema.
    #[must_use]
    pub fn params_schema(mut self, schema: ValidationSchema) -> Self {
        self.params = Some(schema);
        self
    }

    /// Sets the query schema.
    #[must_use]
    pub fn query_schema(mut self, schema: ValidationSchema) -> Self {
        self.query = Some(schema);
        self
    }

    /// Sets the body schema.
    #[must_use]
    pub fn payload_schema(mut self, schema: ValidationSchema) -> Self {
        self.payload = Some(schema);
        self
    }

    /// Documents a response.
    #[must_use]
    pub fn response(mut self, response: ResponseDoc) -> Self {
        self.responses.push(response);
        self
    }

    /// Returns the method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the summary.
    #[must_use]
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the description.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the path parameter schema.
    #[must_use]
    pub const fn params(&self) -> Option<&ValidationSchema> {
        self.params.as_ref()
    }

    /// Returns the query schema.
    #[must_use]
    pub const fn query(&self) -> Option<&ValidationSchema> {
        self.query.as_ref()
    }

    /// Returns the body schema.
    #[must_use]
    pub const fn payload(&self) -> Option<&ValidationSchema> {
        self.payload.as_ref()
    }

    /// Returns the schema for a request part.
    #[must_use]
    pub const fn schema_for(&self, source: InputSource) -> Option<&ValidationSchema> {
        match source {
            InputSource::Params => self.params(),
            InputSource::Query => self.query(),
            InputSource::Payload => self.payload(),
        }
    }

    /// Returns the documented responses.
    #[must_use]
    pub fn responses(&self) -> &[ResponseDoc] {
        &self.responses
    }

    /// Runs the handler.
    pub fn invoke(&self, ctx: RequestContext, request: ValidatedRequest) -> BoxFuture<'static, HandlerResult> {
        (self.handler)(ctx, request)
    }
}

impl std::fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSpec")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("operation_id", &self.operation_id)
            .field("params", &self.params.is_some())
            .field("query", &self.query.is_some())
            .field("payload", &self.payload.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use serde_json::json;

    #[tokio::test]
    async fn test_invoke_handler() {
        let route = RouteSpec::new(Method::GET, "/hello/{name?}", "greet", |_ctx, req| async move {
            let name = req.param("name").unwrap_or("anonymous").to_string();
            HandlerResult::Ok(Reply::text(format!("Hello '{name}' :)")))
        });

        let request = ValidatedRequest::new(json!({ "name": "alice" }), json!({}), Value::Null);
        let reply = route.invoke(RequestContext::new(), request).await.unwrap();
        assert_eq!(reply.body(), &crate::ReplyBody::Text("Hello 'alice' :)".into()));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let route = RouteSpec::new(Method::POST, "/contacts", "addContact", |_ctx, _req| async move {
            HandlerResult::Err(ServiceError::conflict("duplicate"))
        });
        let request = ValidatedRequest::new(json!({}), json!({}), Value::Null);
        let error = route.invoke(RequestContext::new(), request).await.unwrap_err();
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_schema_for() {
        let route = RouteSpec::new(Method::GET, "/search", "search", |_ctx, _req| async move {
            HandlerResult::Ok(Reply::empty(StatusCode::OK))
        })
        .query_schema(ValidationSchema::new().field("text", FieldSchema::string().required()))
        .tag("search")
        .response(ResponseDoc::new(StatusCode::OK, "echo", ResponseContent::Json(None)));

        assert!(route.schema_for(InputSource::Params).is_none());
        assert!(route.schema_for(InputSource::Query).is_some());
        assert!(route.schema_for(InputSource::Payload).is_none());
        assert_eq!(route.tags(), ["search".to_string()]);
        assert_eq!(route.responses().len(), 1);
        assert!(format!("{route:?}").contains("/search"));
    }
}
