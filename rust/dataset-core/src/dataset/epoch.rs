// rust/dataset-core/src/dataset/epoch.rs

use std::iter::FusedIterator;
use std::sync::Arc;

use super::batch::Batch;
use super::record::Record;

/// One epoch over a fold, cut into fixed-size batches.
///
/// The `EpochBatches` walks a precomputed visiting order (identity or a
/// full random permutation of the fold), accumulating records until a
/// batch is full. Once the order is exhausted, a non-empty remainder is
/// emitted only when `last_batch` is set and is otherwise dropped.
///
/// The iterator is single-pass: after it returns `None` it keeps returning
/// `None`. Start a new epoch with `Dataset::get_all_batches`.
#[derive(Debug)]
pub struct EpochBatches<'a> {
    examples: &'a [Arc<Record>],
    order: Vec<usize>,
    cursor: usize,
    pending: Vec<Arc<Record>>,
    batch_size: usize,
    last_batch: bool,
    batch_index: u64,
}

impl<'a> EpochBatches<'a> {
    /// Creates an epoch over `examples` visiting them in `order`.
    ///
    /// `batch_size` must be non-zero and every entry of `order` must be a
    /// valid index into `examples`.
    pub(crate) fn new(
        examples: &'a [Arc<Record>],
        order: Vec<usize>,
        batch_size: usize,
        last_batch: bool,
    ) -> Self {
        debug_assert!(batch_size > 0);
        debug_assert!(order.iter().all(|&i| i < examples.len()));
        Self {
            examples,
            order,
            cursor: 0,
            pending: Vec::with_capacity(batch_size),
            batch_size,
            last_batch,
            batch_index: 0,
        }
    }

    /// Number of positions of the visiting order consumed so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Visiting order for this epoch, as positions into the fold.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Records not yet emitted (pending plus unvisited).
    pub fn remaining_records(&self) -> usize {
        self.pending.len() + self.order.len() - self.cursor
    }

    /// Total batches this epoch emits from the start.
    pub fn planned_batches(&self) -> usize {
        batches_for(self.order.len(), self.batch_size, self.last_batch)
    }

    fn emit(&mut self) -> Batch {
        let records = std::mem::replace(&mut self.pending, Vec::with_capacity(self.batch_size));
        let batch = Batch::new(records, self.batch_index);
        self.batch_index += 1;
        batch
    }
}

impl Iterator for EpochBatches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        while self.cursor < self.order.len() {
            let idx = self.order[self.cursor];
            self.cursor += 1;
            self.pending.push(Arc::clone(&self.examples[idx]));

            if self.pending.len() == self.batch_size {
                return Some(self.emit());
            }
        }

        if self.pending.is_empty() {
            return None;
        }
        if self.last_batch {
            return Some(self.emit());
        }

        // Trailing remainder without last_batch is dropped.
        self.pending.clear();
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = batches_for(self.remaining_records(), self.batch_size, self.last_batch);
        (n, Some(n))
    }
}

impl ExactSizeIterator for EpochBatches<'_> {}

impl FusedIterator for EpochBatches<'_> {}

/// Batches emitted for `len` records: full batches plus an optional remainder.
pub(crate) fn batches_for(len: usize, batch_size: usize, last_batch: bool) -> usize {
    let full = len / batch_size;
    if last_batch && len % batch_size != 0 {
        full + 1
    } else {
        full
    }
}
