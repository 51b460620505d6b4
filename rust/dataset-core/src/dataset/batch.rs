// rust/dataset-core/src/dataset/batch.rs

use std::ops::Index;
use std::sync::Arc;

use super::record::Record;

/// An ordered group of records handed to converters in one step.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub records: Vec<Arc<Record>>,
    /// Position of this batch within its epoch (0 for independent draws).
    pub batch_index: u64,
}

impl Batch {
    pub fn new(records: Vec<Arc<Record>>, batch_index: u64) -> Self {
        Self {
            records,
            batch_index,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Record>> {
        self.records.iter()
    }
}

impl Index<usize> for Batch {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Arc<Record>;
    type IntoIter = std::slice::Iter<'a, Arc<Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for Batch {
    type Item = Arc<Record>;
    type IntoIter = std::vec::IntoIter<Arc<Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
