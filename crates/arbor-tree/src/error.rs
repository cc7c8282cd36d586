//! Error type for hierarchy operations.

use arbor_store::StoreError;

/// Failure while building or projecting a hierarchy.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The unit store failed during traversal.
    #[error("hierarchy retrieval failed: {0}")]
    Retrieval(#[from] StoreError),
    /// A handle named by the caller does not resolve to a unit.
    #[error("unit not found: {0}")]
    NotFound(String),
}
