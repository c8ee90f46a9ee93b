//! Storage error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a [`crate::store::DocumentStore`].
///
/// A corrupt on-disk document is always a [`StoreError::Parse`], never an
/// empty or default document: masking data loss as a fresh start is worse
/// than failing the request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {op} progress file {}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("progress file {} is corrupt: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
