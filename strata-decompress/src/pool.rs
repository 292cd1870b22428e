//! Growable pool of batch states with a free-index list.
//!
//! Merge mode keeps one batch state open per interleaved batch, a number
//! unknown until scan time, so the pool grows on demand. States are
//! addressed by index handle: an index assigned to an open batch stays
//! valid across growth, and a live state's contents are never rebuilt.

use strata_result::{Error, Result};

use crate::batch::BatchState;
use crate::plan::ScanPlan;

/// Stable handle to one pooled batch state.
pub(crate) type BatchId = usize;

/// Number of batch states allocated up front in merge mode.
pub(crate) const INITIAL_BATCH_CAPACITY: usize = 16;

pub(crate) struct BatchStatePool {
    states: Vec<BatchState>,
    free: Vec<BatchId>,
}

impl BatchStatePool {
    /// Create a pool holding `capacity` ready-to-init states, their slot
    /// layouts derived from the plan's decompression map.
    pub fn new(plan: &ScanPlan, capacity: usize) -> Self {
        let mut pool = Self {
            states: Vec::new(),
            free: Vec::new(),
        };
        pool.add_states(plan, capacity);
        pool
    }

    /// Hand out a usable batch state index, doubling capacity when none is
    /// free. O(1) amortized.
    pub fn acquire(&mut self, plan: &ScanPlan) -> Result<BatchId> {
        if self.free.is_empty() {
            let grow_by = self.states.len().max(1);
            self.add_states(plan, grow_by);
            tracing::debug!(capacity = self.states.len(), "batch state pool grown");
        }
        self.free
            .pop()
            .ok_or_else(|| Error::Internal("batch state pool failed to grow".into()))
    }

    /// Return an index to the free list. Tears down the state's per-batch
    /// resources (open iterators, buffers) first.
    pub fn release(&mut self, id: BatchId) {
        self.states[id].clear();
        self.free.push(id);
    }

    /// Tear down every state and rebuild the free list; used on rescan.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.clear();
        }
        self.free = (0..self.states.len()).rev().collect();
    }

    pub fn get(&self, id: BatchId) -> &BatchState {
        &self.states[id]
    }

    pub fn get_mut(&mut self, id: BatchId) -> &mut BatchState {
        &mut self.states[id]
    }

    pub fn capacity(&self) -> usize {
        self.states.len()
    }

    fn add_states(&mut self, plan: &ScanPlan, n: usize) {
        let start = self.states.len();
        self.states.reserve(n);
        for _ in 0..n {
            self.states.push(BatchState::new(plan));
        }
        // Lowest indices pop first, matching allocation order.
        for id in (start..start + n).rev() {
            self.free.push(id);
        }
    }
}
