// rust/dataset-core/src/storage/mod.rs

//! Read-only storage abstraction for dataset files.
//!
//! Datasets are read once, in full, at construction. The `StorageBackend`
//! trait keeps that read behind a seam so tests and callers can supply
//! their own source; `LocalStorage` is the filesystem implementation.
//!
//! # Example
//!
//! ```no_run
//! use dataset_core::config::StorageConfig;
//! use dataset_core::storage::{LocalStorage, StorageBackend};
//! use std::path::Path;
//!
//! let storage = LocalStorage::new(&StorageConfig::default());
//! let bytes = storage.read_all(Path::new("mnist.dataset")).unwrap();
//! ```

mod local;
mod traits;

pub use local::{expand_home, LocalStorage};
pub use traits::{ObjectMeta, StorageBackend};
