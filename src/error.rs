//! Error types surfaced at the resolver and session boundaries.
//!
//! Duplicate adds, removals of absent ids, and navigation on an empty list
//! are normal boolean/notification outcomes and never appear here.

use thiserror::Error;

/// Failure to turn a source descriptor into a playable handle.
///
/// Resolution failures are never cached, so a later attempt with the same
/// metadata retries the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The resolver reported a failure for the given source descriptor.
    #[error("failed to resolve source: {0}")]
    Failed(String),
    /// The resolver did not answer within the configured timeout.
    #[error("resolution timed out after {waited_ms} ms")]
    Timeout { waited_ms: u64 },
}

/// Errors reported by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Resolution(#[from] ResolveError),
    /// Direct index access outside the current track list bounds.
    #[error("index {index} out of range for track list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
