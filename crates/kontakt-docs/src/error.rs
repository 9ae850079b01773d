//! Error types for documentation generation.

use thiserror::Error;

/// Errors that can occur while generating documentation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// The document could not be serialized to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A route cannot be expressed in the document.
    #[error("Invalid operation '{operation_id}': {reason}")]
    InvalidOperation {
        /// The offending operation id.
        operation_id: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
