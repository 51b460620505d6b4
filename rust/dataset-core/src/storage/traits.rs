// rust/dataset-core/src/storage/traits.rs

//! Storage abstraction traits.

use std::path::Path;

use crate::error::Result;

/// Metadata about a stored object.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    /// Size of the object in bytes.
    pub size: u64,
    /// Last modification time, if available.
    pub modified: Option<std::time::SystemTime>,
    /// Whether this object is a directory.
    pub is_dir: bool,
}

/// The core storage backend trait.
///
/// # Object Safety
///
/// This trait is object-safe and can be used with `&dyn StorageBackend`.
pub trait StorageBackend: Send + Sync {
    /// Checks if an object exists at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check fails (e.g., permission denied).
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Retrieves metadata for an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object doesn't exist or metadata cannot be read.
    fn metadata(&self, path: &Path) -> Result<ObjectMeta>;

    /// Reads the full contents of an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object doesn't exist or cannot be read.
    fn read_all(&self, path: &Path) -> Result<Vec<u8>>;

    /// Resolves `path` to the location the backend actually reads.
    fn resolve(&self, path: &Path) -> std::path::PathBuf {
        path.to_path_buf()
    }
}
