// rust/dataset-core/src/dataset/record.rs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field naming the fold a record belongs to.
pub const FOLD_FIELD: &str = "fold";

/// Field compared against `required_class` during rejection sampling.
pub const LABEL_FIELD: &str = "label";

/// Suffix marking a field as a path relative to the dataset's directory.
pub const FILENAME_SUFFIX: &str = "filename";

/// Prefixes marking a field as boolean.
pub const BOOLEAN_PREFIXES: [&str; 2] = ["is_", "has_"];

/// One example: a mapping from field name to a JSON value.
///
/// Records are created once at load time and never mutated afterwards.
/// The dataset shares them as `Arc<Record>` between its record sequence
/// and its fold index.
///
/// A record parsed from a file remembers its 1-based source line. The line
/// is not part of the record's value: it is skipped by serde and ignored by
/// equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
    #[serde(skip)]
    line: Option<usize>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields, line: None }
    }

    /// Tags the record with the file line it was parsed from.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// 1-based source line, when the record came from a file.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The underlying field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Raw value of the `fold` field, if present.
    pub fn fold(&self) -> Option<&Value> {
        self.fields.get(FOLD_FIELD)
    }

    pub fn label(&self) -> Option<&Value> {
        self.fields.get(LABEL_FIELD)
    }

    /// Whether the record's `label` equals `class`. Missing labels never match.
    pub fn has_label(&self, class: &Value) -> bool {
        self.label() == Some(class)
    }

    /// Names of fields ending in `filename`.
    pub fn filename_fields(&self) -> impl Iterator<Item = &str> {
        self.keys().filter(|k| k.ends_with(FILENAME_SUFFIX))
    }

    /// Joins a `*filename` field's string value onto `data_dir`.
    ///
    /// Returns `None` if the field is missing or not a string.
    pub fn resolve_path(&self, field: &str, data_dir: &Path) -> Option<PathBuf> {
        match self.fields.get(field) {
            Some(Value::String(rel)) => Some(data_dir.join(rel)),
            _ => None,
        }
    }

    /// Field-naming convention violations on this record.
    ///
    /// `*filename` fields must be strings, `is_*` and `has_*` fields must be
    /// booleans and `fold` must be a string. An empty result means the
    /// record conforms.
    pub fn convention_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        for (key, value) in &self.fields {
            if key == FOLD_FIELD {
                if !value.is_string() {
                    violations.push(format!("field '{key}' must be a string, got {value}"));
                }
            } else if key.ends_with(FILENAME_SUFFIX) {
                if !value.is_string() {
                    violations.push(format!("field '{key}' must be a path string, got {value}"));
                }
            } else if BOOLEAN_PREFIXES.iter().any(|p| key.starts_with(p))
                && !value.is_boolean()
            {
                violations.push(format!("field '{key}' must be a boolean, got {value}"));
            }
        }
        violations
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::new(map),
            _ => panic!("test records must be objects"),
        }
    }

    #[test]
    fn test_label_match() {
        let r = record(json!({"label": "cat", "x": 1}));
        assert!(r.has_label(&json!("cat")));
        assert!(!r.has_label(&json!("dog")));

        let unlabeled = record(json!({"x": 1}));
        assert!(!unlabeled.has_label(&json!("cat")));
    }

    #[test]
    fn test_numeric_label_does_not_match_string() {
        let r = record(json!({"label": 3}));
        assert!(r.has_label(&json!(3)));
        assert!(!r.has_label(&json!("3")));
    }

    #[test]
    fn test_filename_fields_and_resolve() {
        let r = record(json!({
            "filename": "img/a.jpg",
            "mask_filename": "img/a_mask.png",
            "label": 1
        }));

        let mut fields: Vec<_> = r.filename_fields().collect();
        fields.sort();
        assert_eq!(fields, vec!["filename", "mask_filename"]);

        assert_eq!(
            r.resolve_path("filename", Path::new("/data/mnist")),
            Some(PathBuf::from("/data/mnist/img/a.jpg"))
        );
        assert_eq!(r.resolve_path("label", Path::new("/data")), None);
        assert_eq!(r.resolve_path("missing", Path::new("/data")), None);
    }

    #[test]
    fn test_convention_violations() {
        let good = record(json!({
            "filename": "a.jpg",
            "is_train": true,
            "has_box": false,
            "fold": "val"
        }));
        assert!(good.convention_violations().is_empty());

        let bad = record(json!({"filename": 7, "is_train": "yes", "fold": 1, "color": "blue"}));
        let violations = bad.convention_violations();
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_line_is_not_part_of_value() {
        let plain = record(json!({"a": 1}));
        let tagged = record(json!({"a": 1})).at_line(7);

        assert_eq!(plain.line(), None);
        assert_eq!(tagged.line(), Some(7));
        assert_eq!(plain, tagged);
        assert_eq!(serde_json::to_value(&tagged).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_transparent_serde() {
        let r: Record = serde_json::from_str(r#"{"a": 1, "b": [true, null]}"#).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"a": 1, "b": [true, null]}));
    }
}
