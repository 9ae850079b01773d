//! Server error types.

use kontakt_docs::DocsError;
use thiserror::Error;

/// Errors raised while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address could not be parsed.
    #[error("Invalid address '{addr}': {reason}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parser message.
        reason: String,
    },

    /// The listener could not be bound.
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        /// The address that was tried.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A route declaration is malformed or conflicts with another.
    #[error("Invalid route {method} {path}: {reason}")]
    InvalidRoute {
        /// Route method.
        method: String,
        /// Route path template.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The API documentation could not be generated.
    #[error("Failed to generate API documentation: {0}")]
    Docs(#[from] DocsError),

    /// I/O error while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
