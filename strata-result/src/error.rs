use std::io;

use thiserror::Error;

/// Unified error type for all strata operations.
///
/// Errors propagate upward through the call stack using Rust's `?` operator.
/// At API boundaries they are typically converted to user-facing messages;
/// internal code matches on specific variants where it needs to distinguish
/// plan problems from data problems.
///
/// # Thread Safety
///
/// `Error` implements `Send` and `Sync`, so scan failures can cross thread
/// boundaries when parallel workers each drive their own operator instance.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error surfaced by a storage collaborator.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The decompression map or scan plan handed over by the planner is
    /// empty or malformed. Raised at open, before any row is produced.
    #[error("invalid scan configuration: {0}")]
    InvalidScanConfig(String),

    /// Stored batch contents disagree with their own metadata: a compressed
    /// column out of sync with the batch row count, or a payload that fails
    /// to decode. Batch contents are immutable, so this is never retryable
    /// and aborts the scan.
    #[error("corrupt compressed data: {0}")]
    CorruptData(String),

    /// A projection references a system-identity column that cannot be
    /// synthesized from a decoded row and for which no rewrite applies.
    #[error("unsupported scan shape: {0}")]
    UnsupportedShape(String),

    /// The cooperative abort flag was set; the scan stops at the next batch
    /// boundary.
    #[error("scan cancelled")]
    Cancelled,

    /// Internal error indicating a bug or unexpected state. Should never
    /// occur during normal operation.
    #[error("an internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a [`Error::CorruptData`] from any displayable error.
    ///
    /// Convenience for codec implementations converting their own decode
    /// failures while preserving the original message.
    #[inline]
    pub fn corrupt_data<E: std::fmt::Display>(err: E) -> Self {
        Error::CorruptData(err.to_string())
    }
}
