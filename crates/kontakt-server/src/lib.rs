//! # Kontakt Server
//!
//! HTTP serving for the Kontakt service.
//!
//! - [`Router`] - maps method and path to a [`RouteSpec`](kontakt_core::RouteSpec),
//!   including `{name?}` optional trailing segments
//! - [`RequestPipeline`] - validates params, query and payload in that order,
//!   then runs the handler
//! - [`Server`] - hyper HTTP/1.1 server with request timeouts, graceful
//!   shutdown, `/health` and the documentation endpoints
//!
//! ## Example
//!
//! ```rust,ignore
//! use kontakt_core::FailurePolicy;
//! use kontakt_server::{Server, ServerConfig};
//!
//! let server = Server::builder()
//!     .config(ServerConfig::builder().http_addr("127.0.0.1:8000").build())
//!     .policy(FailurePolicy::production())
//!     .routes(routes)
//!     .build()?;
//!
//! server.run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/kontakt-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod health;
pub mod pipeline;
pub mod router;
mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::ServerError;
pub use health::{HealthCheck, HealthStatus};
pub use pipeline::{RawRequest, RequestPipeline};
pub use router::{RouteLookup, Router};
pub use server::{HttpResponse, ResponseBody, Server, ServerBuilder};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
