//! The codec seam: opening decode iterators over compressed payloads.
//!
//! Compression algorithms live outside this crate. The operator only needs
//! "open a decode iterator for payload P of type T in direction D" and then
//! drives the iterator one value per row.

use strata_result::Result;
use strata_types::{DataType, Direction, EncodedPayload, ScalarValue};

/// Stateful cursor yielding successive decoded values from one compressed
/// column payload.
pub trait DecodeIterator {
    /// Produce the next decoded value, `ScalarValue::Null` for stored nulls,
    /// or `None` once the payload is exhausted.
    ///
    /// A malformed payload fails with `CorruptData`; batch contents are
    /// immutable, so the failure is not retryable and aborts the scan.
    fn try_next(&mut self) -> Result<Option<ScalarValue>>;
}

/// Factory for decode iterators.
///
/// The payload is handed over with shared ownership so the iterator can keep
/// it alive independently of the carrier row it came from; an iterator must
/// never retain a borrow into a recycled batch buffer.
pub trait Codec {
    fn open_iterator(
        &self,
        payload: EncodedPayload,
        data_type: DataType,
        direction: Direction,
    ) -> Result<Box<dyn DecodeIterator>>;
}
