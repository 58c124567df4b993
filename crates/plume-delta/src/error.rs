//! Error types for document construction.

use thiserror::Error;

/// Errors raised while building a document from its serialized form.
///
/// Malformed input is reported to the caller rather than silently
/// repaired; the caller decides between discarding and best-effort
/// recovery.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DocumentError {
    /// The operation list was empty: no run bears the terminating newline.
    #[error("document has no operations: nothing bears the terminating newline")]
    NoOperations,

    /// The operation list failed to parse: unknown embed kind, embed
    /// payload missing required fields, or an insert that is neither
    /// text nor an embed map.
    #[error("malformed operation list: {0}")]
    Parse(#[from] serde_json::Error),
}
