//! In-memory compressed-batch scan.

use strata_decompress::{CarrierCell, CompressedBatch, CompressedBatchScan};
use strata_result::Result;
use strata_types::ScalarValue;

use crate::plain::encode_values;

/// A [`CompressedBatchScan`] over a fixed vector of carrier rows. `rescan`
/// replays the same rows from the start.
pub struct VecScan {
    batches: Vec<CompressedBatch>,
    pos: usize,
}

impl VecScan {
    pub fn new(batches: Vec<CompressedBatch>) -> Self {
        Self { batches, pos: 0 }
    }
}

impl CompressedBatchScan for VecScan {
    fn next_batch(&mut self) -> Result<Option<CompressedBatch>> {
        match self.batches.get(self.pos) {
            Some(batch) => {
                self.pos += 1;
                Ok(Some(batch.clone()))
            }
            None => Ok(None),
        }
    }

    fn rescan(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }
}

/// Build one carrier row from cells plus the trailing row-count scalar.
///
/// The count cell is appended last; pair it with a decompression map whose
/// final entry is `MapEntry::RowCount`.
pub fn carrier_row(mut cells: Vec<CarrierCell>, row_count: i64) -> CompressedBatch {
    cells.push(CarrierCell::Scalar(ScalarValue::Int(row_count)));
    CompressedBatch::new(cells)
}

/// One compressed-stream cell holding the given column values.
pub fn stream_cell(values: &[ScalarValue]) -> CarrierCell {
    CarrierCell::Payload(Some(encode_values(values)))
}

/// One compressed-stream cell whose payload is absent for the whole batch.
pub fn absent_cell() -> CarrierCell {
    CarrierCell::Payload(None)
}

/// One segment-constant cell.
pub fn segment_cell<V: Into<ScalarValue>>(value: V) -> CarrierCell {
    CarrierCell::Scalar(value.into())
}

/// Carrier row for a single-column batch of ints: one stream cell plus the
/// row count.
pub fn int_batch(values: &[i64]) -> CompressedBatch {
    let scalars: Vec<ScalarValue> = values.iter().map(|v| ScalarValue::Int(*v)).collect();
    carrier_row(vec![stream_cell(&scalars)], values.len() as i64)
}
