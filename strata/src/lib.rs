//! strata: columnar decompression scan for row-oriented engines.
//!
//! This crate is the primary entrypoint for the strata decompression
//! toolkit. It re-exports the operator surface from the underlying
//! `strata-*` crates, providing a unified API for embedders.
//!
//! # Architecture
//!
//! - **Operator** (`strata-decompress`): the decompression scan itself,
//!   with its single-stream and merge-append modes.
//! - **Value model** (`strata-types`): scalar values, payloads, sort keys.
//! - **Errors** (`strata-result`): the shared error enum and result alias.
//!
//! The storage scan and the column codec are collaborator seams:
//! implement [`CompressedBatchScan`] and [`Codec`] to plug an engine in.

pub use strata_decompress::{
    CarrierCell, Codec, CompareOp, CompressedBatch, CompressedBatchScan, DecodeIterator,
    DecompressScan, DecompressionMap, FilterExpr, MapEntry, OutputColumn, OutputExpr, OutputSchema,
    ScanPlan,
};
pub use strata_result::{Error, Result};
pub use strata_types::{
    DataType, Direction, EncodedPayload, ScalarValue, SortDirection, SortKey,
};
