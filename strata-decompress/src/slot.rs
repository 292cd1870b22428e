//! Per-column decode state for one open batch.

use strata_types::{DataType, ScalarValue};

use crate::codec::DecodeIterator;
use crate::plan::{MapEntry, OutputSchema};

/// Decode state for one column of one open batch.
///
/// The role is a tagged union dispatched with one match per row per column;
/// this sits on the hot path of every decoded row.
pub(crate) struct ColumnSlot {
    /// Position of this column in the compressed carrier row.
    pub source: usize,
    pub kind: SlotKind,
}

pub(crate) enum SlotKind {
    /// Segment-constant column: a cached (value, nullability) pair restated
    /// for every row of the batch.
    Segment {
        output: usize,
        value: ScalarValue,
    },
    /// Compressed column driven by a decode iterator. `None` means the
    /// payload was absent for the whole batch: every row decodes to the
    /// schema default without consulting any iterator.
    Stream {
        output: usize,
        data_type: DataType,
        iterator: Option<Box<dyn DecodeIterator>>,
    },
    /// The batch cardinality column; cached once into the batch counter.
    RowCount,
    /// Ordering metadata for the merge comparator; no per-row decode.
    OrderingKey,
}

/// Derive slot skeletons from the decompression map. Per-batch values and
/// iterators are filled in at batch init.
pub(crate) fn build_slots(entries: &[MapEntry], schema: &OutputSchema) -> Vec<ColumnSlot> {
    let mut slots = Vec::new();
    for (source, entry) in entries.iter().enumerate() {
        let kind = match entry {
            MapEntry::Segment { output } => SlotKind::Segment {
                output: *output,
                value: ScalarValue::Null,
            },
            MapEntry::Stream { output } => SlotKind::Stream {
                output: *output,
                data_type: schema.column(*output).data_type,
                iterator: None,
            },
            MapEntry::RowCount => SlotKind::RowCount,
            MapEntry::OrderingKey => SlotKind::OrderingKey,
            MapEntry::Skip => continue,
        };
        slots.push(ColumnSlot { source, kind });
    }
    slots
}
