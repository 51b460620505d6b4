// rust/dataset-core/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {

    #[error("Storage error at '{path}': {message}")]
    Storage {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Failed to decompress '{path}'")]
    Decompression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Format error on line {line}: {message}")]
    Format {
        line: usize,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Fold '{fold}' not found (available: {})", .available.join(", "))]
    FoldNotFound {
        fold: String,
        available: Vec<String>,
    },

    #[error("Index {index} out of range for fold '{fold}' (len: {len})")]
    IndexOutOfRange {
        fold: String,
        index: usize,
        len: usize,
    },

    #[error("No example with label {class} in fold '{fold}' after {attempts} draws")]
    ClassNotFound {
        fold: String,
        class: String,
        attempts: usize,
    },

    #[error("Example {index} in fold '{fold}' does not have label {class}")]
    ClassMismatch {
        fold: String,
        index: usize,
        class: String,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Converter error: {message}")]
    Converter {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

pub type Result<T> = std::result::Result<T, DatasetError>;

// Convenience constructors
impl DatasetError {

    pub fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn decompression(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Decompression {
            path: path.into(),
            source,
        }
    }

    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
            source: None,
        }
    }

    pub fn format_with_source(
        line: usize,
        message: impl Into<String>,
        source: serde_json::Error,
    ) -> Self {
        Self::Format {
            line,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn fold_not_found<'a>(
        fold: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::FoldNotFound {
            fold: fold.into(),
            available: available.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn index_out_of_range(fold: impl Into<String>, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            fold: fold.into(),
            index,
            len,
        }
    }

    pub fn class_not_found(
        fold: impl Into<String>,
        class: &serde_json::Value,
        attempts: usize,
    ) -> Self {
        Self::ClassNotFound {
            fold: fold.into(),
            class: class.to_string(),
            attempts,
        }
    }

    pub fn class_mismatch(
        fold: impl Into<String>,
        index: usize,
        class: &serde_json::Value,
    ) -> Self {
        Self::ClassMismatch {
            fold: fold.into(),
            index,
            class: class.to_string(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn converter(message: impl Into<String>) -> Self {
        Self::Converter {
            message: message.into(),
            source: None,
        }
    }

    pub fn converter_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Converter {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error is a lookup failure (unknown fold or bad index).
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::FoldNotFound { .. } | Self::IndexOutOfRange { .. })
    }
}
