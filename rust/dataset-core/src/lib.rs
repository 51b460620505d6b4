// rust/dataset-core/src/lib.rs

//! Dataset Utilities - Core Library
//!
//! This crate loads fold-partitioned `.dataset` files (newline-delimited
//! JSON, optionally gzipped), samples examples and batches from a fold,
//! merges datasets, and drives converted batch iteration for training
//! loops.

pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::LoaderConfig;
pub use error::{DatasetError, Result};
pub use storage::{LocalStorage, ObjectMeta, StorageBackend};

pub mod dataset;
pub use dataset::{Batch, Dataset, DatasetOptions, EpochBatches, FoldIndex, Record};

pub mod convert;
pub use convert::{Converter, FieldConverter, LabelIndexConverter};

pub mod loader;
pub use loader::{DataLoader, DataLoaderIter};
