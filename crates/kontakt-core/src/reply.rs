//! Structured handler results.
//!
//! A [`Reply`] is a status code plus a body. Handlers return one; the server
//! turns it into an HTTP response with the matching content type.
//!
//! | Body | Content-Type |
//! |------|--------------|
//! | [`ReplyBody::Json`] | `application/json` |
//! | [`ReplyBody::Text`] | `text/plain; charset=utf-8` |
//! | [`ReplyBody::Empty`] | none |

use crate::error::ServiceError;
use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Content type for JSON bodies.
const JSON: &str = "application/json";
/// Content type for plain text bodies.
const TEXT: &str = "text/plain; charset=utf-8";

/// Body of a [`Reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// No body.
    Empty,
    /// Plain text.
    Text(String),
    /// A JSON value.
    Json(Value),
}

/// A status code and body returned by a handler.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use kontakt_core::Reply;
/// use serde_json::json;
///
/// let reply = Reply::json(json!({ "contacts": [] })).with_status(StatusCode::OK);
/// assert_eq!(reply.content_type(), Some("application/json"));
///
/// let reply = Reply::text("This user already exists!").with_status(StatusCode::CONFLICT);
/// assert_eq!(reply.status(), StatusCode::CONFLICT);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    body: ReplyBody,
}

impl Reply {
    /// Creates a reply with an explicit status and body.
    #[must_use]
    pub const fn new(status: StatusCode, body: ReplyBody) -> Self {
        Self { status, body }
    }

    /// A 200 reply with a JSON body.
    #[must_use]
    pub const fn json(value: Value) -> Self {
        Self::new(StatusCode::OK, ReplyBody::Json(value))
    }

    /// A 200 reply with a plain text body.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, ReplyBody::Text(text.into()))
    }

    /// A reply with no body.
    #[must_use]
    pub const fn empty(status: StatusCode) -> Self {
        Self::new(status, ReplyBody::Empty)
    }

    /// A 200 reply with `data` serialized as JSON.
    pub fn serialize<T: Serialize>(data: &T) -> Result<Self, ServiceError> {
        serde_json::to_value(data)
            .map(Self::json)
            .map_err(|e| ServiceError::internal_with_source("Failed to serialize response", e))
    }

    /// Replaces the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &ReplyBody {
        &self.body
    }

    /// Returns the content type for the body, if it has one.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self.body {
            ReplyBody::Empty => None,
            ReplyBody::Text(_) => Some(TEXT),
            ReplyBody::Json(_) => Some(JSON),
        }
    }

    /// Consumes the reply and returns the encoded body.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        match self.body {
            ReplyBody::Empty => Bytes::new(),
            ReplyBody::Text(text) => Bytes::from(text),
            ReplyBody::Json(value) => Bytes::from(value.to_string()),
        }
    }

    /// Renders an error as its JSON envelope with the error's status code.
    #[must_use]
    pub fn error(error: &ServiceError, request_id: Option<&str>) -> Self {
        let envelope = error.to_envelope(request_id);
        let body = serde_json::to_value(&envelope).unwrap_or(Value::Null);
        Self::new(error.status_code(), ReplyBody::Json(body))
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_reply() {
        let reply = Reply::text("Hello 'alice' :)");
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(reply.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(reply.into_bytes(), Bytes::from("Hello 'alice' :)"));
    }

    #[test]
    fn test_json_reply_with_status() {
        let reply = Reply::json(json!({ "contact": { "name": "Jan" } })).with_status(StatusCode::CREATED);
        assert_eq!(reply.status(), StatusCode::CREATED);
        let body: Value = serde_json::from_slice(&reply.into_bytes()).unwrap();
        assert_eq!(body["contact"]["name"], "Jan");
    }

    #[test]
    fn test_serialize_reply() {
        #[derive(Serialize)]
        struct Item {
            id: u32,
        }
        let reply = Reply::serialize(&Item { id: 7 }).unwrap();
        assert_eq!(reply.body(), &ReplyBody::Json(json!({ "id": 7 })));
    }

    #[test]
    fn test_empty_reply_has_no_content_type() {
        let reply = Reply::empty(StatusCode::NO_CONTENT);
        assert!(reply.content_type().is_none());
        assert!(reply.into_bytes().is_empty());
    }

    #[test]
    fn test_error_reply() {
        let reply = Reply::error(&ServiceError::conflict("taken"), Some("req-1"));
        assert_eq!(reply.status(), StatusCode::CONFLICT);
        let ReplyBody::Json(body) = reply.body() else {
            panic!("expected JSON body");
        };
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["request_id"], "req-1");
    }
}
