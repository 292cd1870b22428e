//! Decompression execution operator for the strata columnar store.
//!
//! Stored data arrives as *batches*: contiguous, independently compressed
//! groups of rows carried as single rows of an underlying compressed-segment
//! scan. This crate turns those carrier rows back into ordinary decoded rows
//! behind a pull-based open/next/rescan/close lifecycle.
//!
//! Two operating modes share all of the per-batch decode machinery:
//!
//! - **Single stream** ([`single`]): one batch is open at a time; it is
//!   drained fully before the next carrier row is fetched. Output order is
//!   batch arrival order with intra-batch storage order preserved.
//! - **Merge append** ([`merge`]): every visited batch stays open and a
//!   binary heap interleaves their current rows by the pushed-down sort
//!   keys, reproducing a global order across many internally-sorted
//!   segments without a full sort.
//!
//! External collaborators are consumed through traits: the compressed-batch
//! scan ([`scan::CompressedBatchScan`]) supplies carrier rows, and the codec
//! ([`codec::Codec`]) opens per-column decode iterators over opaque
//! payloads. The planner's decisions arrive pre-made as a
//! [`plan::ScanPlan`].

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use strata_result::{Error, Result};

pub mod batch;
pub mod codec;
pub mod exec;
pub mod expr;
pub mod merge;
pub mod plan;
pub mod pool;
pub mod scan;
pub mod single;
pub mod slot;

pub use codec::{Codec, DecodeIterator};
pub use exec::DecompressScan;
pub use expr::{CompareOp, FilterExpr, OutputExpr};
pub use plan::{DecompressionMap, MapEntry, OutputColumn, OutputSchema, ScanPlan};
pub use scan::{CarrierCell, CompressedBatch, CompressedBatchScan};

/// Cooperative cancellation check, run once per batch fetched rather than
/// per row.
#[inline]
pub(crate) fn check_abort(abort: Option<&AtomicBool>) -> Result<()> {
    match abort {
        Some(flag) if flag.load(AtomicOrdering::Relaxed) => Err(Error::Cancelled),
        _ => Ok(()),
    }
}
