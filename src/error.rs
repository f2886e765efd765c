//! Error types for the editing engine.

use thiserror::Error;

/// Errors surfaced by editor operations.
///
/// Invalid operations are no-ops from the document's point of view: the
/// caller gets an error to surface as a notice, but nothing was mutated.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
