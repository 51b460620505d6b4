// rust/dataset-core/src/config.rs

//! Configuration management for dataset loading.
//!
//! This module provides configuration parsing from TOML files, environment
//! variable overrides, and validation of configuration values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::dataset::DEFAULT_FOLD;
use crate::error::{DatasetError, Result};

// Top-level loader configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub loader: BatchConfig,
    pub sampling: SamplingConfig,
    pub storage: StorageConfig,
}

/// Which fold to read and how to cut it into batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Fold to iterate over.
    pub fold: String,
    /// Records per batch.
    pub batch_size: usize,
    /// Whether each epoch visits the fold in a fresh random order.
    pub shuffle: bool,
    /// Whether to emit the trailing partial batch of an epoch.
    pub last_batch: bool,
    /// Cap on records kept per fold (random subset, drawn once at load).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_count: Option<usize>,
    /// Seed for the dataset's random source. Entropy when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

// Random-draw tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Upper bound on draws when sampling for a required class.
    pub max_rejection_attempts: usize,
}

// Storage options for reading the dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    // Buffer size in bytes for buffered reads.
    pub buffer_size: usize,
    // Whether to use memory-mapped I/O.
    pub use_mmap: bool,
    // File size threshold (bytes) above which to use mmap.
    pub mmap_threshold: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            fold: DEFAULT_FOLD.to_string(),
            batch_size: 16,
            shuffle: true,
            last_batch: false,
            example_count: None,
            seed: None,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_rejection_attempts: 10_000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024, // 64 KB
            use_mmap: true,
            mmap_threshold: 1024 * 1024, // 1 MB
        }
    }
}

impl FromStr for LoaderConfig {
    type Err = DatasetError;

    /// Parse configuration from a TOML string.
    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| DatasetError::config_with_source("failed to parse TOML config", e))
    }
}

impl LoaderConfig {
    // Load configuration from a TOML file.
    //
    // # Errors
    //
    // Returns an error if the file cannot be read, parsed, or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DatasetError::storage_with_source(path, "failed to read config file", e)
        })?;
        let config: Self = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    // Apply environment variable overrides.
    //
    // Environment variables are prefixed with `DSU_` and use underscores
    // to separate nested fields, e.g. `DSU_LOADER_BATCH_SIZE` overrides
    // `loader.batch_size`. Values that fail to parse are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        // Loader overrides
        if let Ok(val) = std::env::var("DSU_LOADER_FOLD") {
            self.loader.fold = val;
        }
        if let Ok(val) = std::env::var("DSU_LOADER_BATCH_SIZE") {
            if let Ok(v) = val.parse() {
                self.loader.batch_size = v;
            }
        }
        if let Ok(val) = std::env::var("DSU_LOADER_SHUFFLE") {
            if let Ok(v) = val.parse() {
                self.loader.shuffle = v;
            }
        }
        if let Ok(val) = std::env::var("DSU_LOADER_LAST_BATCH") {
            if let Ok(v) = val.parse() {
                self.loader.last_batch = v;
            }
        }
        if let Ok(val) = std::env::var("DSU_LOADER_EXAMPLE_COUNT") {
            if let Ok(v) = val.parse() {
                self.loader.example_count = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DSU_LOADER_SEED") {
            if let Ok(v) = val.parse() {
                self.loader.seed = Some(v);
            }
        }

        // Sampling overrides
        if let Ok(val) = std::env::var("DSU_SAMPLING_MAX_REJECTION_ATTEMPTS") {
            if let Ok(v) = val.parse() {
                self.sampling.max_rejection_attempts = v;
            }
        }

        // Storage overrides
        if let Ok(val) = std::env::var("DSU_STORAGE_BUFFER_SIZE") {
            if let Ok(v) = val.parse() {
                self.storage.buffer_size = v;
            }
        }
        if let Ok(val) = std::env::var("DSU_STORAGE_USE_MMAP") {
            if let Ok(v) = val.parse() {
                self.storage.use_mmap = v;
            }
        }
        if let Ok(val) = std::env::var("DSU_STORAGE_MMAP_THRESHOLD") {
            if let Ok(v) = val.parse() {
                self.storage.mmap_threshold = v;
            }
        }

        self
    }

    // Validate all configuration values.
    //
    // # Errors
    //
    // Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.loader.fold.is_empty() {
            return Err(DatasetError::config("loader.fold must not be empty"));
        }

        if self.loader.batch_size == 0 {
            return Err(DatasetError::config(
                "loader.batch_size must be greater than 0",
            ));
        }

        if self.loader.example_count == Some(0) {
            return Err(DatasetError::config(
                "loader.example_count must be greater than 0 when set",
            ));
        }

        if self.sampling.max_rejection_attempts == 0 {
            return Err(DatasetError::config(
                "sampling.max_rejection_attempts must be greater than 0",
            ));
        }

        if self.storage.buffer_size == 0 {
            return Err(DatasetError::config(
                "storage.buffer_size must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();

        assert_eq!(config.loader.fold, "train");
        assert_eq!(config.loader.batch_size, 16);
        assert!(config.loader.shuffle);
        assert!(!config.loader.last_batch);
        assert!(config.loader.example_count.is_none());
        assert!(config.loader.seed.is_none());

        assert_eq!(config.sampling.max_rejection_attempts, 10_000);

        assert_eq!(config.storage.buffer_size, 64 * 1024);
        assert!(config.storage.use_mmap);
        assert_eq!(config.storage.mmap_threshold, 1024 * 1024);
    }

    #[test]
    fn test_default_validates() {
        assert!(LoaderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_str_empty() {
        let config: LoaderConfig = "".parse().unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.loader.batch_size, 16);
    }

    #[test]
    fn test_from_str_full() {
        let toml = r#"
            [loader]
            fold = "val"
            batch_size = 4
            shuffle = false
            last_batch = true
            example_count = 100
            seed = 7

            [sampling]
            max_rejection_attempts = 50

            [storage]
            buffer_size = 4096
            use_mmap = false
            mmap_threshold = 2048
        "#;

        let config: LoaderConfig = toml.parse().unwrap();

        assert_eq!(config.loader.fold, "val");
        assert_eq!(config.loader.batch_size, 4);
        assert!(!config.loader.shuffle);
        assert!(config.loader.last_batch);
        assert_eq!(config.loader.example_count, Some(100));
        assert_eq!(config.loader.seed, Some(7));
        assert_eq!(config.sampling.max_rejection_attempts, 50);
        assert_eq!(config.storage.buffer_size, 4096);
        assert!(!config.storage.use_mmap);
        assert_eq!(config.storage.mmap_threshold, 2048);
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result: std::result::Result<LoaderConfig, _> = "batch_size = [".parse();
        assert!(matches!(result, Err(DatasetError::Config { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [loader]
            fold = "test"
            "#
        )
        .unwrap();

        let config = LoaderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.loader.fold, "test");
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[loader]\nbatch_size = 0").unwrap();

        let err = LoaderConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_from_file_not_found() {
        let result = LoaderConfig::from_file("/nonexistent/loader.toml");
        assert!(matches!(result, Err(DatasetError::Storage { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_example_count() {
        let mut config = LoaderConfig::default();
        config.loader.example_count = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_fold() {
        let mut config = LoaderConfig::default();
        config.loader.fold.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = LoaderConfig::default();
        config.sampling.max_rejection_attempts = 0;
        assert!(config.validate().is_err());
    }

    fn clear_dsu_env_vars() {
        for (key, _) in std::env::vars() {
            if key.starts_with("DSU_") {
                std::env::remove_var(&key);
            }
        }
    }

    // Env vars are process-global, so all override cases live in one test.
    #[test]
    fn test_env_overrides() {
        clear_dsu_env_vars();

        std::env::set_var("DSU_LOADER_FOLD", "val");
        std::env::set_var("DSU_LOADER_BATCH_SIZE", "32");
        std::env::set_var("DSU_LOADER_SHUFFLE", "false");
        std::env::set_var("DSU_LOADER_SEED", "99");
        std::env::set_var("DSU_STORAGE_USE_MMAP", "false");

        let config = LoaderConfig::default().with_env_overrides();

        assert_eq!(config.loader.fold, "val");
        assert_eq!(config.loader.batch_size, 32);
        assert!(!config.loader.shuffle);
        assert_eq!(config.loader.seed, Some(99));
        assert!(!config.storage.use_mmap);

        clear_dsu_env_vars();

        std::env::set_var("DSU_LOADER_BATCH_SIZE", "lots");
        let config = LoaderConfig::default().with_env_overrides();
        assert_eq!(config.loader.batch_size, 16);

        clear_dsu_env_vars();
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut original = LoaderConfig::default();
        original.loader.example_count = Some(12);
        let toml_str = toml::to_string(&original).unwrap();
        let parsed: LoaderConfig = toml_str.parse().unwrap();

        assert_eq!(original.loader.fold, parsed.loader.fold);
        assert_eq!(original.loader.example_count, parsed.loader.example_count);
        assert_eq!(original.storage.buffer_size, parsed.storage.buffer_size);
    }
}
