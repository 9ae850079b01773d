//! # Kontakt Docs
//!
//! API documentation for the Kontakt service.
//!
//! - [`OpenApiGenerator`] builds an OpenAPI 3.1 document from the route table
//! - [`SwaggerUi`] renders an interactive page for that document
//!
//! ```
//! use http::Method;
//! use kontakt_core::{FieldSchema, HandlerResult, Reply, RouteSpec, ValidationSchema};
//! use kontakt_docs::{OpenApiGenerator, SwaggerUi};
//!
//! let routes = vec![RouteSpec::new(Method::GET, "/search", "search", |_ctx, req| async move {
//!     HandlerResult::Ok(Reply::json(req.into_query()))
//! })
//! .query_schema(ValidationSchema::new().field("text", FieldSchema::string().required()))];
//!
//! let spec = OpenApiGenerator::new()
//!     .title("Kontakt")
//!     .version("0.1.0")
//!     .generate(&routes)
//!     .unwrap();
//! assert!(spec.paths.contains_key("/search"));
//!
//! let page = SwaggerUi::new("/documentation", "/swagger.json", &spec.info.title).html();
//! assert!(page.contains("/swagger.json"));
//! ```

mod error;
mod openapi;
mod swagger;

pub use error::{DocsError, DocsResult};
pub use openapi::{
    Info, MediaType, OpenApi, OpenApiGenerator, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, Schema, SchemaType, Server, Tag,
};
pub use swagger::{DocExpansion, SwaggerUi};
