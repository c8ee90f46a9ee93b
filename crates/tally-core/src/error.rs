//! Engine error taxonomy.
//!
//! Three buckets, mapped to HTTP-equivalent statuses at the serve boundary:
//! invalid input (400), missing plan/group/item (404), and storage failures
//! (500). Storage failures are fatal to the request only; the process keeps
//! running and the next request may succeed.

use thiserror::Error;

use tally_store::error::StoreError;

/// Errors returned by the mutation engine.
#[derive(Debug, Error)]
pub enum TrackError {
    /// A required request field is missing or malformed. Never retried.
    #[error("missing or invalid field: {0}")]
    InvalidInput(String),

    /// A referenced plan, group, or item does not exist where required.
    #[error("{0}")]
    NotFound(String),

    /// The backing store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_names_the_field() {
        let err = TrackError::InvalidInput("itemId".to_string());
        assert_eq!(err.to_string(), "missing or invalid field: itemId");
    }

    #[test]
    fn store_errors_convert_transparently() {
        let source = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let store_err = StoreError::Parse {
            path: "/tmp/progress.json".into(),
            source,
        };
        let msg = store_err.to_string();
        let err: TrackError = store_err.into();
        assert_eq!(err.to_string(), msg);
    }
}
