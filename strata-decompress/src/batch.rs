//! One open batch: column slots, the remaining-row counter, and the row
//! emission path.

use std::sync::Arc;

use strata_result::{Error, Result};
use strata_types::{Direction, ScalarValue};

use crate::codec::Codec;
use crate::plan::ScanPlan;
use crate::scan::CompressedBatch;
use crate::slot::{ColumnSlot, SlotKind, build_slots};

/// Decode state for one open compressed batch.
///
/// The decoded row is written into a single reusable buffer, overwritten in
/// place on every advance; nothing per row is allocated. Whether the buffer
/// currently holds a row is an explicit two-state machine: `has_row` flips
/// to false exactly when the batch reports exhaustion.
pub(crate) struct BatchState {
    columns: Vec<ColumnSlot>,
    /// Rows left to decode, from the batch's declared cardinality.
    remaining: i64,
    row: Vec<ScalarValue>,
    has_row: bool,
}

impl BatchState {
    pub fn new(plan: &ScanPlan) -> Self {
        Self {
            columns: build_slots(plan.map.entries(), &plan.schema),
            remaining: 0,
            row: vec![ScalarValue::Null; plan.schema.width()],
            has_row: false,
        }
    }

    /// Tear down per-batch resources: open decode iterators are dropped and
    /// the state forgets its current row. Called before releasing the state
    /// back to the pool and on rescan.
    pub fn clear(&mut self) {
        for slot in &mut self.columns {
            if let SlotKind::Stream { iterator, .. } = &mut slot.kind {
                *iterator = None;
            }
        }
        self.remaining = 0;
        self.has_row = false;
    }

    /// Re-initialize this state from a freshly fetched carrier row.
    ///
    /// This is the per-batch bulk reset: previous iterators are dropped
    /// wholesale before any slot is refilled, so nothing from the prior
    /// batch can leak into this one.
    pub fn init<C: Codec>(
        &mut self,
        batch: &CompressedBatch,
        codec: &C,
        plan: &ScanPlan,
    ) -> Result<()> {
        self.clear();
        let direction = if plan.reverse {
            Direction::Reverse
        } else {
            Direction::Forward
        };

        for slot in &mut self.columns {
            match &mut slot.kind {
                SlotKind::Segment { value, .. } => {
                    *value = batch.scalar(slot.source)?.clone();
                }
                SlotKind::Stream {
                    data_type,
                    iterator,
                    ..
                } => {
                    *iterator = match batch.payload(slot.source)? {
                        Some(payload) => Some(codec.open_iterator(
                            Arc::clone(payload),
                            *data_type,
                            direction,
                        )?),
                        None => None,
                    };
                }
                SlotKind::RowCount => match batch.scalar(slot.source)? {
                    ScalarValue::Int(n) if *n >= 0 => self.remaining = *n,
                    other => {
                        return Err(Error::CorruptData(format!(
                            "batch row count must be a non-negative integer, got {other:?}"
                        )));
                    }
                },
                SlotKind::OrderingKey => {}
            }
        }
        Ok(())
    }

    /// The row emission path: advance every slot by one unit.
    ///
    /// Exhaustion is computed from the remaining-row counter up front; every
    /// present stream iterator must agree with it in the same call. A stream
    /// yielding a value past the declared count, or ending while rows
    /// remain, is a fatal consistency error. Returns true when a row was
    /// produced into the reusable buffer.
    pub fn advance(&mut self, plan: &ScanPlan) -> Result<bool> {
        let batch_done = self.remaining <= 0;

        for slot in &mut self.columns {
            match &mut slot.kind {
                SlotKind::Segment { output, value } => {
                    if !batch_done {
                        self.row[*output] = value.clone();
                    }
                }
                SlotKind::Stream {
                    output, iterator, ..
                } => match iterator {
                    None => {
                        // Absent payload: whole batch takes the schema
                        // default, no iterator consulted.
                        if !batch_done {
                            self.row[*output] = plan.schema.column(*output).default.clone();
                        }
                    }
                    Some(it) => match it.try_next()? {
                        Some(_) if batch_done => {
                            return Err(Error::CorruptData(
                                "compressed column out of sync with batch counter".into(),
                            ));
                        }
                        Some(value) => {
                            self.row[*output] = value;
                        }
                        None if !batch_done => {
                            return Err(Error::CorruptData(
                                "compressed column out of sync with batch counter".into(),
                            ));
                        }
                        None => {}
                    },
                },
                SlotKind::RowCount | SlotKind::OrderingKey => {}
            }
        }

        if batch_done {
            self.has_row = false;
            Ok(false)
        } else {
            self.remaining -= 1;
            self.has_row = true;
            Ok(true)
        }
    }

    /// The current decoded row. Only meaningful while the state machine is
    /// in the has-current-row state.
    pub fn row(&self) -> &[ScalarValue] {
        &self.row
    }

    #[cfg(test)]
    pub fn has_row(&self) -> bool {
        self.has_row
    }
}
