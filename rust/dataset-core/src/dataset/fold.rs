// rust/dataset-core/src/dataset/fold.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::error::{DatasetError, Result};

use super::record::{Record, FOLD_FIELD};

/// Fold assigned to records without a `fold` field.
pub const DEFAULT_FOLD: &str = "train";

/// Partition of a record sequence into named folds.
///
/// Every record belongs to exactly one fold, and records keep their
/// original relative order inside a fold (until `subsample` reorders them).
#[derive(Debug, Clone, Default)]
pub struct FoldIndex {
    folds: BTreeMap<String, Vec<Arc<Record>>>,
}

impl FoldIndex {
    /// Partitions `records` by their `fold` field.
    ///
    /// # Errors
    ///
    /// Returns a format error if a record's `fold` is not a string. The
    /// reported line is the record's source line, or its 1-based position
    /// in `records` when it was not parsed from a file.
    pub fn build(records: &[Arc<Record>]) -> Result<Self> {
        let mut folds: BTreeMap<String, Vec<Arc<Record>>> = BTreeMap::new();

        for (i, record) in records.iter().enumerate() {
            let fold = fold_name(record, record.line().unwrap_or(i + 1))?;
            match folds.get_mut(fold) {
                Some(members) => members.push(Arc::clone(record)),
                None => {
                    folds.insert(fold.to_string(), vec![Arc::clone(record)]);
                }
            }
        }

        Ok(Self { folds })
    }

    /// Members of `fold`, in order.
    ///
    /// # Errors
    ///
    /// Returns `FoldNotFound` if no record belongs to `fold`.
    pub fn get(&self, fold: &str) -> Result<&[Arc<Record>]> {
        self.folds
            .get(fold)
            .map(Vec::as_slice)
            .ok_or_else(|| DatasetError::fold_not_found(fold, self.names()))
    }

    /// Number of records in `fold`.
    pub fn len(&self, fold: &str) -> Result<usize> {
        self.get(fold).map(<[_]>::len)
    }

    /// Number of records across all folds.
    pub fn total(&self) -> usize {
        self.folds.values().map(Vec::len).sum()
    }

    pub fn contains(&self, fold: &str) -> bool {
        self.folds.contains_key(fold)
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// Fold names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.folds.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<Record>])> {
        self.folds.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Replaces each fold with a random subset of at most `limit` records.
    ///
    /// Each fold is shuffled and then truncated, so the kept records end up
    /// in random order.
    pub fn subsample<R: Rng + ?Sized>(&mut self, limit: usize, rng: &mut R) {
        for members in self.folds.values_mut() {
            members.shuffle(rng);
            members.truncate(limit);
        }
    }
}

fn fold_name(record: &Record, line: usize) -> Result<&str> {
    match record.fold() {
        None => Ok(DEFAULT_FOLD),
        Some(Value::String(fold)) => Ok(fold),
        Some(other) => Err(DatasetError::format(
            line,
            format!("field '{FOLD_FIELD}' must be a string, got {other}"),
        )),
    }
}
