//! The compressed-segment scan seam.
//!
//! The storage layer stores one compressed batch as one *carrier row*: raw
//! scalar cells for segment-constant columns and batch metadata, plus one
//! opaque encoded payload per compressed column. The operator pulls carrier
//! rows through [`CompressedBatchScan`] and never looks behind it.

use strata_result::{Error, Result};
use strata_types::{EncodedPayload, ScalarValue};

/// One cell of a carrier row.
#[derive(Debug, Clone)]
pub enum CarrierCell {
    /// A raw, uncompressed scalar: segment-constant column values and the
    /// batch row count travel this way.
    Scalar(ScalarValue),
    /// One compressed column's encoded payload. `None` means the payload is
    /// absent for the entire batch and the column decodes as the output
    /// schema's default (normally null) for every row.
    Payload(Option<EncodedPayload>),
}

/// One compressed batch as handed over by the storage scan.
#[derive(Debug, Clone)]
pub struct CompressedBatch {
    cells: Vec<CarrierCell>,
}

impl CompressedBatch {
    pub fn new(cells: Vec<CarrierCell>) -> Self {
        Self { cells }
    }

    /// Number of physical compressed-input positions in this carrier row.
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// Fetch the raw scalar at a carrier position.
    pub fn scalar(&self, pos: usize) -> Result<&ScalarValue> {
        match self.cells.get(pos) {
            Some(CarrierCell::Scalar(value)) => Ok(value),
            Some(CarrierCell::Payload(_)) => Err(Error::CorruptData(format!(
                "carrier position {pos} holds a payload where a scalar was expected"
            ))),
            None => Err(Error::CorruptData(format!(
                "carrier row has no position {pos}"
            ))),
        }
    }

    /// Fetch the encoded payload at a carrier position.
    pub fn payload(&self, pos: usize) -> Result<Option<&EncodedPayload>> {
        match self.cells.get(pos) {
            Some(CarrierCell::Payload(payload)) => Ok(payload.as_ref()),
            Some(CarrierCell::Scalar(_)) => Err(Error::CorruptData(format!(
                "carrier position {pos} holds a scalar where a payload was expected"
            ))),
            None => Err(Error::CorruptData(format!(
                "carrier row has no position {pos}"
            ))),
        }
    }
}

/// Pull iterator over compressed-batch carrier rows.
///
/// The only unbounded-latency call in the operator is `next_batch`; its
/// suspension behavior is the storage collaborator's concern. `rescan`
/// re-drives the scan from the start for operator rescans.
pub trait CompressedBatchScan {
    fn next_batch(&mut self) -> Result<Option<CompressedBatch>>;

    fn rescan(&mut self) -> Result<()>;
}
