// rust/dataset-core/src/storage/local.rs

//! Local filesystem storage backend implementation.
//!
//! Small files go through a buffered reader; files above the configured
//! threshold are memory-mapped and copied out in one pass.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use super::traits::{ObjectMeta, StorageBackend};
use crate::config::StorageConfig;
use crate::error::{DatasetError, Result};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Base path that relative paths resolve against.
    base_path: PathBuf,
    /// Buffer size for buffered I/O operations.
    buffer_size: usize,
    /// Whether to use memory-mapped I/O.
    use_mmap: bool,
    /// File size threshold above which to use mmap.
    mmap_threshold: u64,
}

impl LocalStorage {
    /// Creates a `LocalStorage` rooted at the current directory.
    pub fn new(config: &StorageConfig) -> Self {
        Self::with_base_path(".", config)
    }

    /// Creates a `LocalStorage` whose relative paths resolve under `base_path`.
    pub fn with_base_path(base_path: impl Into<PathBuf>, config: &StorageConfig) -> Self {
        Self {
            base_path: base_path.into(),
            buffer_size: config.buffer_size,
            use_mmap: config.use_mmap,
            mmap_threshold: config.mmap_threshold,
        }
    }

    /// Resolves a path relative to the base path.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        let path = expand_home(path);
        if path.is_absolute() {
            path
        } else {
            self.base_path.join(path)
        }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(&StorageConfig::default())
    }
}

/// Expands a leading `~` to `$HOME`. Other paths are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

impl StorageBackend for LocalStorage {
    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.resolve_path(path).exists())
    }

    fn metadata(&self, path: &Path) -> Result<ObjectMeta> {
        let full_path = self.resolve_path(path);
        let meta = fs::metadata(&full_path).map_err(|e| {
            DatasetError::storage_with_source(&full_path, "failed to read metadata", e)
        })?;

        Ok(ObjectMeta {
            size: meta.len(),
            modified: meta.modified().ok(),
            is_dir: meta.is_dir(),
        })
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = self.resolve_path(path);
        let file = File::open(&full_path).map_err(|e| {
            DatasetError::storage_with_source(&full_path, "failed to open file", e)
        })?;

        let meta = file.metadata().map_err(|e| {
            DatasetError::storage_with_source(&full_path, "failed to read file metadata", e)
        })?;
        if meta.is_dir() {
            return Err(DatasetError::storage(&full_path, "path is a directory"));
        }
        let size = meta.len();

        if self.use_mmap && size >= self.mmap_threshold && size > 0 {
            // SAFETY: The file is opened read-only and the map is dropped
            // before this function returns.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| {
                DatasetError::storage_with_source(&full_path, "failed to memory-map file", e)
            })?;
            return Ok(mmap.to_vec());
        }

        let mut data = Vec::with_capacity(size as usize);
        BufReader::with_capacity(self.buffer_size, file)
            .read_to_end(&mut data)
            .map_err(|e| DatasetError::storage_with_source(&full_path, "failed to read file", e))?;
        Ok(data)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.resolve_path(path)
    }
}
