//! K-way merge decompression: a binary heap of batch indices interleaving
//! many open batches by the pushed-down sort keys.
//!
//! The heap stores indices only. Each batch's current row lives in that
//! batch state's reusable buffer and mutates in place between heap
//! operations, so every comparison re-derives its keys by looking the row up
//! at compare time; a cached snapshot inside a heap node would go stale.

use std::cmp::Ordering;
use std::sync::atomic::AtomicBool;

use strata_result::Result;
use strata_types::{ScalarValue, SortKey, compare_values};

use crate::check_abort;
use crate::codec::Codec;
use crate::plan::ScanPlan;
use crate::pool::{BatchId, BatchStatePool, INITIAL_BATCH_CAPACITY};
use crate::scan::CompressedBatchScan;

/// Binary min-heap of batch indices with a caller-supplied comparator per
/// operation.
///
/// The comparator cannot live inside the heap because it needs the batch
/// state pool, which is mutated between operations; passing it per call
/// keeps the borrows disjoint.
pub(crate) struct MergeHeap {
    entries: Vec<BatchId>,
}

impl MergeHeap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append without restoring heap order; call [`MergeHeap::build`] once
    /// all initial entries are in.
    pub fn push_unordered(&mut self, id: BatchId) {
        self.entries.push(id);
    }

    /// Bottom-up heapify, O(n).
    pub fn build<F>(&mut self, mut cmp: F)
    where
        F: FnMut(BatchId, BatchId) -> Ordering,
    {
        let len = self.entries.len();
        for i in (0..len / 2).rev() {
            self.sift_down(i, &mut cmp);
        }
    }

    /// The index whose current row sorts first.
    pub fn first(&self) -> Option<BatchId> {
        self.entries.first().copied()
    }

    /// Restore heap order after the top entry's current row changed in
    /// place. One sift, not a pop plus a push.
    pub fn replace_first<F>(&mut self, mut cmp: F)
    where
        F: FnMut(BatchId, BatchId) -> Ordering,
    {
        if !self.entries.is_empty() {
            self.sift_down(0, &mut cmp);
        }
    }

    /// Drop the top entry permanently.
    pub fn remove_first<F>(&mut self, mut cmp: F) -> Option<BatchId>
    where
        F: FnMut(BatchId, BatchId) -> Ordering,
    {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let removed = self.entries.pop();
        if !self.entries.is_empty() {
            self.sift_down(0, &mut cmp);
        }
        removed
    }

    fn sift_down<F>(&mut self, mut pos: usize, cmp: &mut F)
    where
        F: FnMut(BatchId, BatchId) -> Ordering,
    {
        let len = self.entries.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                return;
            }
            let right = left + 1;
            let mut smallest = pos;
            if cmp(self.entries[left], self.entries[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && cmp(self.entries[right], self.entries[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == pos {
                return;
            }
            self.entries.swap(pos, smallest);
            pos = smallest;
        }
    }
}

/// Multi-key comparator over two batches' current rows. Keys apply left to
/// right and short-circuit at the first inequality; fully equal keys are
/// unordered (the heap does not preserve arrival order among ties).
fn compare_batch_rows(
    pool: &BatchStatePool,
    sort_keys: &[SortKey],
    a: BatchId,
    b: BatchId,
) -> Ordering {
    let row_a = pool.get(a).row();
    let row_b = pool.get(b).row();
    for key in sort_keys {
        let ord = compare_values(&row_a[key.column], &row_b[key.column], key);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Merge-append decompressor: keeps all visited batches open and produces
/// one globally ordered row stream.
pub(crate) struct MergeDecompress {
    pool: BatchStatePool,
    heap: MergeHeap,
    primed: bool,
}

impl MergeDecompress {
    pub fn new(plan: &ScanPlan) -> Self {
        Self {
            pool: BatchStatePool::new(plan, INITIAL_BATCH_CAPACITY),
            heap: MergeHeap::new(),
            primed: false,
        }
    }

    /// Produce the next row in global sort order, or `None` at end of
    /// stream. End of stream is terminal until a rescan.
    pub fn next_row<S: CompressedBatchScan, C: Codec>(
        &mut self,
        scan: &mut S,
        codec: &C,
        plan: &ScanPlan,
        abort: Option<&AtomicBool>,
    ) -> Result<Option<&[ScalarValue]>> {
        if !self.primed {
            self.prime(scan, codec, plan, abort)?;
        } else if let Some(top) = self.heap.first() {
            // The row we returned last time came from `top`; decode its
            // replacement now, delayed to the moment it is needed.
            let produced = self.pool.get_mut(top).advance(plan)?;
            let Self { heap, pool, .. } = self;
            if produced {
                heap.replace_first(|a, b| compare_batch_rows(pool, &plan.sort_keys, a, b));
            } else {
                heap.remove_first(|a, b| compare_batch_rows(pool, &plan.sort_keys, a, b));
                pool.release(top);
            }
        }

        match self.heap.first() {
            Some(top) => Ok(Some(self.pool.get(top).row())),
            None => Ok(None),
        }
    }

    /// First call only: drain the compressed scan, open a batch state per
    /// carrier row, decode each batch's first row, then heapify once.
    fn prime<S: CompressedBatchScan, C: Codec>(
        &mut self,
        scan: &mut S,
        codec: &C,
        plan: &ScanPlan,
        abort: Option<&AtomicBool>,
    ) -> Result<()> {
        loop {
            check_abort(abort)?;
            let Some(batch) = scan.next_batch()? else {
                break;
            };
            let id = self.pool.acquire(plan)?;
            let state = self.pool.get_mut(id);
            state.init(&batch, codec, plan)?;
            if state.advance(plan)? {
                self.heap.push_unordered(id);
            } else {
                // Batch declared zero rows; nothing to merge.
                self.pool.release(id);
            }
        }

        let Self { heap, pool, .. } = self;
        heap.build(|a, b| compare_batch_rows(pool, &plan.sort_keys, a, b));
        tracing::debug!(
            batches = heap.len(),
            pool_capacity = pool.capacity(),
            "merge heap primed"
        );
        self.primed = true;
        Ok(())
    }

    /// Drop every open batch and forget the heap; the next call re-primes.
    pub fn reset(&mut self) {
        self.heap.clear();
        self.pool.reset();
        self.primed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Heap over a plain value table; the comparator indexes into it the
    // same way the merge comparator indexes into the pool.
    fn drain(values: &[i64], heap: &mut MergeHeap) -> Vec<i64> {
        let mut out = Vec::new();
        while let Some(top) = heap.first() {
            out.push(values[top]);
            heap.remove_first(|a, b| values[a].cmp(&values[b]));
        }
        out
    }

    #[test]
    fn heapify_and_drain_sorts() {
        let values = vec![5, 1, 4, 2, 3];
        let mut heap = MergeHeap::new();
        for id in 0..values.len() {
            heap.push_unordered(id);
        }
        heap.build(|a, b| values[a].cmp(&values[b]));
        assert_eq!(drain(&values, &mut heap), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn replace_first_resifts_in_place() {
        let mut values = vec![1, 3, 5];
        let mut heap = MergeHeap::new();
        for id in 0..values.len() {
            heap.push_unordered(id);
        }
        heap.build(|a, b| values[a].cmp(&values[b]));
        assert_eq!(heap.first(), Some(0));

        // Entry 0's value advances past the others.
        values[0] = 9;
        heap.replace_first(|a, b| values[a].cmp(&values[b]));
        assert_eq!(heap.first(), Some(1));
        assert_eq!(drain(&values, &mut heap), vec![3, 5, 9]);
    }

    #[test]
    fn remove_first_on_empty_is_none() {
        let mut heap = MergeHeap::new();
        assert_eq!(heap.remove_first(|_, _| Ordering::Equal), None);
        assert!(heap.is_empty());
    }
}
