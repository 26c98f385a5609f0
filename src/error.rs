//! Error types for verstak library.

use std::io;
use thiserror::Error;

/// Result type alias for verstak operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading source trees or rule files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A source tree or rule file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A typography rule names a bracket kind the engine does not know.
    #[error("Unknown glue kind: {0}")]
    UnknownGlueKind(String),

    /// A typography rule section is malformed.
    #[error("Invalid typography rule '{name}': {reason}")]
    InvalidRule {
        /// Section name in the rule file
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A hyperlink points at a relationship id the document does not define.
    #[error("Hyperlink relationship not found: {0}")]
    MissingRelationship(String),

    /// Error during rendering (markup, HTML, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}
