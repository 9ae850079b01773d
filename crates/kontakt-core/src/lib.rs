//! # Kontakt Core
//!
//! Core types shared by every Kontakt crate.
//!
//! - [`ValidationSchema`] / [`FieldSchema`] - Declarative request schemas and the validator
//! - [`FailurePolicy`] - Deployment-mode gate for client-visible validation detail
//! - [`RouteSpec`] - Method, path template, schemas and handler for one route
//! - [`Reply`] - Structured handler result (status + body)
//! - [`ServiceError`] - Standard error type and JSON error envelope
//! - [`RequestContext`] - Per-request id and operation metadata

#![doc(html_root_url = "https://docs.rs/kontakt-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod policy;
mod reply;
mod route;
pub mod schema;

pub use context::{RequestContext, RequestId};
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, ServiceError};
pub use policy::{DeploymentMode, FailurePolicy, GENERIC_BAD_REQUEST_MESSAGE};
pub use reply::{Reply, ReplyBody};
pub use route::{
    BoxFuture, Handler, HandlerResult, ResponseContent, ResponseDoc, RouteSpec, ValidatedRequest,
};
pub use schema::{
    Constraint, FieldSchema, FieldType, InputSource, ValidationOutcome, ValidationSchema,
    Violation,
};
