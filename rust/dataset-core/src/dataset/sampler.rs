// rust/dataset-core/src/dataset/sampler.rs

//! Access patterns over a fold: independent random draws and full epochs.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::error::{DatasetError, Result};

use super::batch::Batch;
use super::epoch::EpochBatches;
use super::handle::Dataset;
use super::record::Record;

impl Dataset {
    /// Returns one record of `fold`.
    ///
    /// With `idx`, the record at that position is returned. Without it, a
    /// position is drawn uniformly at random. With `required_class`, the
    /// record's `label` must equal it: random draws are retried up to the
    /// dataset's `max_rejection_attempts`, while a fixed `idx` whose label
    /// does not match fails immediately.
    ///
    /// Rejection sampling is only efficient when the class is not rare in
    /// the fold.
    ///
    /// # Errors
    ///
    /// - `FoldNotFound` for an unknown fold
    /// - `IndexOutOfRange` for a bad `idx`, or a random draw from an empty fold
    /// - `ClassMismatch` when `idx` is given and its label differs
    /// - `ClassNotFound` when every random draw was rejected
    pub fn get_example(
        &self,
        fold: &str,
        idx: Option<usize>,
        required_class: Option<&Value>,
    ) -> Result<Arc<Record>> {
        let examples = self.folds.get(fold)?;

        if let Some(idx) = idx {
            let record = examples
                .get(idx)
                .ok_or_else(|| DatasetError::index_out_of_range(fold, idx, examples.len()))?;
            if let Some(class) = required_class {
                if !record.has_label(class) {
                    return Err(DatasetError::class_mismatch(fold, idx, class));
                }
            }
            return Ok(Arc::clone(record));
        }

        if examples.is_empty() {
            return Err(DatasetError::index_out_of_range(fold, 0, 0));
        }

        let mut rng = self.rng.borrow_mut();
        let Some(class) = required_class else {
            return Ok(Arc::clone(&examples[rng.gen_range(0..examples.len())]));
        };

        for _ in 0..self.max_rejection_attempts {
            let record = &examples[rng.gen_range(0..examples.len())];
            if record.has_label(class) {
                return Ok(Arc::clone(record));
            }
        }

        tracing::warn!(
            "Gave up sampling label {} from fold '{}' after {} draws",
            class,
            fold,
            self.max_rejection_attempts
        );
        Err(DatasetError::class_not_found(
            fold,
            class,
            self.max_rejection_attempts,
        ))
    }

    /// Draws `batch_size` records from `fold` independently at random.
    ///
    /// Draws are with replacement, so a batch may repeat a record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero batch size, otherwise the same
    /// errors as `get_example`.
    pub fn get_batch(
        &self,
        fold: &str,
        batch_size: usize,
        required_class: Option<&Value>,
    ) -> Result<Batch> {
        check_batch_size(batch_size)?;

        let records = (0..batch_size)
            .map(|_| self.get_example(fold, None, required_class))
            .collect::<Result<Vec<_>>>()?;
        Ok(Batch::new(records, 0))
    }

    /// Starts one epoch over `fold`.
    ///
    /// Each record is visited once, in fold order or in a fresh uniform
    /// permutation when `shuffle` is set. The trailing partial batch is
    /// emitted only when `last_batch` is set. Call again for the next epoch.
    ///
    /// # Errors
    ///
    /// Returns `FoldNotFound` for an unknown fold and `InvalidArgument` for
    /// a zero batch size.
    pub fn get_all_batches(
        &self,
        fold: &str,
        batch_size: usize,
        shuffle: bool,
        last_batch: bool,
    ) -> Result<EpochBatches<'_>> {
        check_batch_size(batch_size)?;
        let examples = self.folds.get(fold)?;

        let mut order: Vec<usize> = (0..examples.len()).collect();
        if shuffle {
            order.shuffle(&mut *self.rng.borrow_mut());
        }

        let epoch = EpochBatches::new(examples, order, batch_size, last_batch);
        tracing::debug!(
            "Starting epoch over fold '{}': {} batches of {} (shuffle={}, last_batch={})",
            fold,
            epoch.planned_batches(),
            batch_size,
            shuffle,
            last_batch
        );
        Ok(epoch)
    }
}

fn check_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(DatasetError::invalid_argument(
            "batch_size must be greater than 0",
        ));
    }
    Ok(())
}
