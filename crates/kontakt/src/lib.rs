//! # Kontakt
//!
//! A small HTTP service with three endpoints and a validating request
//! pipeline in front of them:
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET` | `/hello/{name?}` | `Hello '<name>' :)` or an anonymous greeting |
//! | `GET` | `/search` | the validated query, defaults applied |
//! | `GET` | `/contacts` | `{"contacts": [...]}` |
//! | `POST` | `/contacts` | `201 {"contact": {...}}` or `409` on a duplicate |
//!
//! The server also answers `/health`, `/swagger.json` and `/documentation`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kontakt::build_server;
//! use kontakt_config::ConfigLoader;
//! use kontakt_registry::ContactRegistry;
//!
//! let config = ConfigLoader::from_env()?;
//! let server = build_server(&config, Arc::new(ContactRegistry::new()))?;
//! server.run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/kontakt/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod handlers;
mod routes;

pub use routes::{build_routes, build_server, server_config};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
