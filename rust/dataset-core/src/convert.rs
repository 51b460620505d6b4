// rust/dataset-core/src/convert.rs

//! Converters turn a batch of records into model-ready data.
//!
//! The loader holds two converters, one for inputs and one for labels, and
//! knows nothing about what they produce. Implement `Converter` to plug in
//! image decoding, tokenization, one-hot encoding and so on.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::dataset::{Batch, Dataset, LABEL_FIELD};
use crate::error::{DatasetError, Result};

/// Turns a batch of records into an output value.
pub trait Converter {
    type Output;

    /// Converts every record of `batch`, preserving order.
    fn convert(&self, batch: &Batch) -> Result<Self::Output>;

    /// Number of classes this converter distinguishes (0 if not a classifier).
    fn num_classes(&self) -> usize {
        0
    }

    /// Class names, indexed by class id.
    fn labels(&self) -> &[String] {
        &[]
    }
}

/// Maps a label field to a dense class index.
///
/// Classes are the distinct JSON values of the field across the whole
/// dataset, so `3` and `"3"` are different classes, matching
/// `Record::has_label`. Class ids follow the sorted JSON text of each value.
/// Display names use string values verbatim and the JSON text otherwise.
#[derive(Debug, Clone)]
pub struct LabelIndexConverter {
    field: String,
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelIndexConverter {
    /// Builds the class table from the dataset's `label` field.
    pub fn new(dataset: &Dataset) -> Self {
        Self::for_field(dataset, LABEL_FIELD)
    }

    /// Builds the class table from `field`. Records without it are skipped.
    pub fn for_field(dataset: &Dataset, field: &str) -> Self {
        let classes: BTreeMap<String, &Value> = dataset
            .records()
            .iter()
            .filter_map(|r| r.get(field))
            .map(|value| (class_key(value), value))
            .collect();

        let labels = classes.values().map(|value| display_name(value)).collect();
        let index = classes
            .into_keys()
            .enumerate()
            .map(|(i, key)| (key, i))
            .collect();

        Self {
            field: field.to_string(),
            labels,
            index,
        }
    }

    /// Class id of `value`, if it is a known class.
    pub fn class_index(&self, value: &Value) -> Option<usize> {
        self.index.get(&class_key(value)).copied()
    }
}

impl Converter for LabelIndexConverter {
    type Output = Vec<usize>;

    fn convert(&self, batch: &Batch) -> Result<Vec<usize>> {
        batch
            .iter()
            .map(|record| {
                let value = record.get(&self.field).ok_or_else(|| {
                    DatasetError::converter(format!("record has no '{}' field", self.field))
                })?;
                self.class_index(value).ok_or_else(|| {
                    DatasetError::converter(format!("unknown {} {}", self.field, value))
                })
            })
            .collect()
    }

    fn num_classes(&self) -> usize {
        self.labels.len()
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Extracts one field from each record as a raw JSON value.
#[derive(Debug, Clone)]
pub struct FieldConverter {
    field: String,
}

impl FieldConverter {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Converter for FieldConverter {
    type Output = Vec<Value>;

    fn convert(&self, batch: &Batch) -> Result<Vec<Value>> {
        batch
            .iter()
            .map(|record| {
                record.get(&self.field).cloned().ok_or_else(|| {
                    DatasetError::converter(format!("record has no '{}' field", self.field))
                })
            })
            .collect()
    }
}

// JSON text keeps values of different types apart.
fn class_key(value: &Value) -> String {
    value.to_string()
}

fn display_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
