//! Error types and result definitions for the strata decompression engine.
//!
//! All strata crates share a single error enum ([`Error`]) and result alias
//! ([`Result<T>`]). Every fallible operation returns `Result<T>` and
//! propagates failures with the `?` operator; there are no retries anywhere
//! in the engine, so an error aborts the enclosing scan.
//!
//! # Error Categories
//!
//! - **Plan errors** ([`Error::InvalidScanConfig`]): a malformed or empty
//!   decompression map handed over by the planner. Raised at open, before
//!   any row is produced.
//! - **Data errors** ([`Error::CorruptData`]): stored batch contents that
//!   disagree with their own metadata. Batches are immutable, so these are
//!   never retryable.
//! - **Shape errors** ([`Error::UnsupportedShape`]): a projection references
//!   a system-identity column that cannot be synthesized from decoded rows.
//! - **Cancellation** ([`Error::Cancelled`]): the cooperative abort flag was
//!   observed between batches.
//! - **Internal errors** ([`Error::Internal`]): violated invariants; bugs.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
