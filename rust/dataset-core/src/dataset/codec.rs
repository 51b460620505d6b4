// rust/dataset-core/src/dataset/codec.rs

//! Decoding of `.dataset` file contents into records.
//!
//! A `.dataset` file is newline-delimited JSON, optionally gzip-compressed.
//! Compression is detected from the two-byte gzip magic number rather than
//! from the file extension.

use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use serde_json::Value;

use crate::error::{DatasetError, Result};

use super::record::Record;

/// First two bytes of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Compression applied to a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    /// Detects compression from the leading bytes of `data`.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&GZIP_MAGIC) {
            Self::Gzip
        } else {
            Self::None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
        }
    }
}

/// Decodes raw file bytes into text, gunzipping first if needed.
///
/// `path` is only used for error reporting.
///
/// # Errors
///
/// Returns an error if the gzip stream is corrupt or the text is not UTF-8.
pub fn decode(data: &[u8], path: &Path) -> Result<String> {
    let bytes = match Compression::detect(data) {
        Compression::None => data.to_vec(),
        Compression::Gzip => {
            tracing::info!("Decompressing gzip file size {}", data.len());
            let mut out = Vec::with_capacity(data.len() * 4);
            MultiGzDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| DatasetError::decompression(path, e))?;
            out
        }
    };

    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        DatasetError::format(line, format!("invalid UTF-8 in {}", path.display()))
    })
}

/// Parses newline-delimited JSON objects into records, in file order.
///
/// Blank lines are skipped. Line numbers in errors are 1-based and count
/// blank lines.
///
/// # Errors
///
/// Returns a format error for the first line that is not a JSON object.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for (i, line) in text.split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(parse_line(line, i + 1)?);
    }

    Ok(records)
}

fn parse_line(line: &str, line_no: usize) -> Result<Record> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| DatasetError::format_with_source(line_no, "invalid JSON", e))?;

    match value {
        Value::Object(fields) => Ok(Record::new(fields).at_line(line_no)),
        other => Err(DatasetError::format(
            line_no,
            format!("expected a JSON object, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
