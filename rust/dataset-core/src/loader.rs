// rust/dataset-core/src/loader.rs

//! Converted batch iteration for training loops.
//!
//! The `DataLoader` ties a `Dataset` to a fold, a batch policy and two
//! converters, and yields `(inputs, labels)` pairs.
//!
//! # Example
//!
//! ```no_run
//! use dataset_core::config::LoaderConfig;
//! use dataset_core::convert::{FieldConverter, LabelIndexConverter};
//! use dataset_core::loader::DataLoader;
//!
//! let config = LoaderConfig::default();
//! let loader = DataLoader::open(
//!     "mnist.dataset",
//!     &config,
//!     |_| Ok(FieldConverter::new("filename")),
//!     |ds| Ok(LabelIndexConverter::new(ds)),
//! )?;
//!
//! for step in loader.iter()? {
//!     let (filenames, classes) = step?;
//! }
//! # Ok::<(), dataset_core::DatasetError>(())
//! ```

use std::path::Path;

use serde_json::Value;

use crate::config::{BatchConfig, LoaderConfig};
use crate::convert::Converter;
use crate::dataset::{Batch, Dataset, DatasetOptions, EpochBatches};
use crate::error::{DatasetError, Result};
use crate::storage::LocalStorage;

/// Batched, converted iteration over one fold of a dataset.
pub struct DataLoader<I, L> {
    dataset: Dataset,
    input_conv: I,
    label_conv: L,
    fold: String,
    batch_size: usize,
    shuffle: bool,
    last_batch: bool,
}

impl<I, L> std::fmt::Debug for DataLoader<I, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("dataset", &self.dataset.name())
            .field("fold", &self.fold)
            .field("batch_size", &self.batch_size)
            .field("shuffle", &self.shuffle)
            .field("last_batch", &self.last_batch)
            .finish()
    }
}

impl<I: Converter, L: Converter> DataLoader<I, L> {
    /// Creates a loader over an already-loaded dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if `batch_size` is zero or the fold does not exist.
    pub fn new(
        dataset: Dataset,
        config: &BatchConfig,
        input_conv: I,
        label_conv: L,
    ) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(DatasetError::invalid_argument(
                "batch_size must be greater than 0",
            ));
        }
        dataset.fold(&config.fold)?;

        Ok(Self {
            dataset,
            input_conv,
            label_conv,
            fold: config.fold.clone(),
            batch_size: config.batch_size,
            shuffle: config.shuffle,
            last_batch: config.last_batch,
        })
    }

    /// Loads `path` from the local filesystem and builds both converters
    /// from the loaded dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the dataset fails
    /// to load, or a converter factory fails.
    pub fn open(
        path: impl AsRef<Path>,
        config: &LoaderConfig,
        make_input: impl FnOnce(&Dataset) -> Result<I>,
        make_label: impl FnOnce(&Dataset) -> Result<L>,
    ) -> Result<Self> {
        config.validate()?;

        let storage = LocalStorage::new(&config.storage);
        let dataset = Dataset::open_with(&storage, path, DatasetOptions::from(config))?;
        let input_conv = make_input(&dataset)?;
        let label_conv = make_label(&dataset)?;

        Self::new(dataset, &config.loader, input_conv, label_conv)
    }

    /// Starts a new epoch.
    ///
    /// Every call reshuffles (when enabled) and starts from the beginning;
    /// an exhausted iterator never wraps around on its own.
    pub fn iter(&self) -> Result<DataLoaderIter<'_, I, L>> {
        let batches = self.dataset.get_all_batches(
            &self.fold,
            self.batch_size,
            self.shuffle,
            self.last_batch,
        )?;
        Ok(DataLoaderIter {
            loader: self,
            batches,
        })
    }

    /// Converts one batch of independent random draws.
    pub fn get_batch(&self, required_class: Option<&Value>) -> Result<(I::Output, L::Output)> {
        let batch = self
            .dataset
            .get_batch(&self.fold, self.batch_size, required_class)?;
        self.convert(&batch)
    }

    /// Runs both converters over `batch`.
    pub fn convert(&self, batch: &Batch) -> Result<(I::Output, L::Output)> {
        let inputs = self.input_conv.convert(batch)?;
        let labels = self.label_conv.convert(batch)?;
        Ok((inputs, labels))
    }

    /// Number of full batches per epoch.
    ///
    /// This ignores `last_batch`: when the trailing partial batch is
    /// emitted, an epoch yields one more item than `len()` reports.
    pub fn len(&self) -> usize {
        self.count() / self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records in the loader's fold.
    pub fn count(&self) -> usize {
        self.dataset.count(Some(&self.fold)).unwrap_or(0)
    }

    pub fn num_classes(&self) -> usize {
        self.label_conv.num_classes()
    }

    /// Class name for class id `idx`, as reported by the label converter.
    pub fn class_name(&self, idx: usize) -> Option<&str> {
        self.label_conv.labels().get(idx).map(String::as_str)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn fold(&self) -> &str {
        &self.fold
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn input_converter(&self) -> &I {
        &self.input_conv
    }

    pub fn label_converter(&self) -> &L {
        &self.label_conv
    }
}

/// One epoch of converted batches.
pub struct DataLoaderIter<'a, I, L> {
    loader: &'a DataLoader<I, L>,
    batches: EpochBatches<'a>,
}

impl<I, L> DataLoaderIter<'_, I, L> {
    /// The underlying epoch state.
    pub fn epoch(&self) -> &EpochBatches<'_> {
        &self.batches
    }
}

impl<'a, I: Converter, L: Converter> Iterator for DataLoaderIter<'a, I, L> {
    type Item = Result<(I::Output, L::Output)>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.batches.next()?;
        Some(self.loader.convert(&batch))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.batches.size_hint()
    }
}
