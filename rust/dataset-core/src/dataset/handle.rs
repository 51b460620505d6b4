// rust/dataset-core/src/dataset/handle.rs

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::LoaderConfig;
use crate::error::{DatasetError, Result};
use crate::storage::{LocalStorage, StorageBackend};

use super::codec;
use super::fold::FoldIndex;
use super::record::{Record, FOLD_FIELD};

/// Construction options for a `Dataset`.
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// Keep at most this many randomly chosen records per fold.
    pub example_count: Option<usize>,
    /// Seed for the dataset's random source. Entropy when unset.
    pub seed: Option<u64>,
    /// Draw budget for class-filtered random sampling.
    pub max_rejection_attempts: usize,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            example_count: None,
            seed: None,
            max_rejection_attempts: 10_000,
        }
    }
}

impl From<&LoaderConfig> for DatasetOptions {
    fn from(config: &LoaderConfig) -> Self {
        Self {
            example_count: config.loader.example_count,
            seed: config.loader.seed,
            max_rejection_attempts: config.sampling.max_rejection_attempts,
        }
    }
}

impl DatasetOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_example_count(mut self, example_count: usize) -> Self {
        self.example_count = Some(example_count);
        self
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// An in-memory dataset partitioned into folds.
///
/// The handle owns every record and the fold index over them. Sampling
/// draws from a random source owned by the handle, so a `Dataset` can move
/// between threads but cannot be shared by them.
pub struct Dataset {
    pub(crate) name: String,
    pub(crate) data_dir: PathBuf,
    pub(crate) records: Vec<Arc<Record>>,
    pub(crate) folds: FoldIndex,
    pub(crate) rng: RefCell<StdRng>,
    pub(crate) max_rejection_attempts: usize,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("name", &self.name)
            .field("data_dir", &self.data_dir)
            .field("num_records", &self.records.len())
            .field("folds", &self.folds.names().collect::<Vec<_>>())
            .finish()
    }
}

impl Dataset {
    /// Loads a `.dataset` file from the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decompressed, a line
    /// is not a JSON object, or a `fold` value is not a string.
    pub fn open(path: impl AsRef<Path>, options: DatasetOptions) -> Result<Self> {
        Self::open_with(&LocalStorage::default(), path, options)
    }

    /// Loads a `.dataset` file through `storage`.
    ///
    /// The dataset's name is the file name without its extension and its
    /// data directory is the file's parent directory.
    pub fn open_with(
        storage: &dyn StorageBackend,
        path: impl AsRef<Path>,
        options: DatasetOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let resolved = storage.resolve(path);

        if !storage.exists(path)? {
            return Err(DatasetError::storage(&resolved, "dataset file not found"));
        }
        let meta = storage.metadata(path)?;
        if meta.is_dir {
            return Err(DatasetError::storage(&resolved, "dataset path is a directory"));
        }
        tracing::debug!("Reading {} ({} bytes)", resolved.display(), meta.size);

        let data = storage.read_all(path)?;

        let name = resolved
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data_dir = resolved
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let text = codec::decode(&data, &resolved)?;
        Self::from_text(name, data_dir, &text, options)
    }

    /// Builds a dataset from raw file bytes (plain or gzip).
    pub fn from_bytes(
        name: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        data: &[u8],
        options: DatasetOptions,
    ) -> Result<Self> {
        let name = name.into();
        let text = codec::decode(data, Path::new(&name))?;
        Self::from_text(name, data_dir, &text, options)
    }

    /// Builds a dataset from decoded newline-delimited JSON.
    pub fn from_text(
        name: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        text: &str,
        options: DatasetOptions,
    ) -> Result<Self> {
        let records = codec::parse_records(text)?;
        Self::from_records(name, data_dir, records, options)
    }

    /// Builds a dataset from already-parsed records, in order.
    pub fn from_records(
        name: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        records: Vec<Record>,
        options: DatasetOptions,
    ) -> Result<Self> {
        if options.example_count == Some(0) {
            return Err(DatasetError::invalid_argument(
                "example_count must be greater than 0",
            ));
        }
        if options.max_rejection_attempts == 0 {
            return Err(DatasetError::invalid_argument(
                "max_rejection_attempts must be greater than 0",
            ));
        }

        let mut records: Vec<Arc<Record>> = records.into_iter().map(Arc::new).collect();
        let mut folds = FoldIndex::build(&records)?;
        let mut rng = options.rng();

        if let Some(limit) = options.example_count {
            tracing::info!("Randomly selecting {} examples", limit);
            folds.subsample(limit, &mut rng);

            let kept: HashSet<*const Record> = folds
                .iter()
                .flat_map(|(_, members)| members.iter().map(Arc::as_ptr))
                .collect();
            records.retain(|r| kept.contains(&Arc::as_ptr(r)));
        }

        let dataset = Self {
            name: name.into(),
            data_dir: data_dir.into(),
            records,
            folds,
            rng: RefCell::new(rng),
            max_rejection_attempts: options.max_rejection_attempts,
        };
        dataset.log_summary();
        Ok(dataset)
    }

    pub(crate) fn log_summary(&self) {
        tracing::info!(
            "Dataset {} contains {} examples:",
            self.name,
            self.records.len()
        );
        for (fold, members) in self.folds.iter() {
            tracing::info!("\tFold '{}': {} examples", fold, members.len());
        }
    }

    /// Display name: the source file stem, or `a-b` after a merge.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory that `*filename` fields are relative to.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// All records, in load order.
    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn folds(&self) -> &FoldIndex {
        &self.folds
    }

    pub fn fold_names(&self) -> impl Iterator<Item = &str> {
        self.folds.names()
    }

    /// Members of `fold`, in order.
    ///
    /// # Errors
    ///
    /// Returns `FoldNotFound` for an unknown fold.
    pub fn fold(&self, fold: &str) -> Result<&[Arc<Record>]> {
        self.folds.get(fold)
    }

    /// Total records when `fold` is `None`, otherwise the size of `fold`.
    ///
    /// # Errors
    ///
    /// Returns `FoldNotFound` for an unknown fold.
    pub fn count(&self, fold: Option<&str>) -> Result<usize> {
        match fold {
            Some(fold) => self.folds.len(fold),
            None => Ok(self.records.len()),
        }
    }

    /// Iterates `fold` in order.
    pub fn get_all_examples(&self, fold: &str) -> Result<std::slice::Iter<'_, Arc<Record>>> {
        Ok(self.folds.get(fold)?.iter())
    }

    /// Resolves a `*filename` field of `record` against `data_dir`.
    pub fn resolve_path(&self, record: &Record, field: &str) -> Option<PathBuf> {
        record.resolve_path(field, &self.data_dir)
    }

    /// Checks the field conventions of the `.dataset` format.
    ///
    /// Every key present on any record must be present on all records
    /// (except `fold`), and typed field names must carry matching values.
    /// Loading never runs this check.
    ///
    /// # Errors
    ///
    /// Returns a format error naming the source line of the first offending
    /// record.
    pub fn check_conventions(&self) -> Result<()> {
        let mut all_keys: HashSet<&str> = HashSet::new();
        for record in &self.records {
            all_keys.extend(record.keys().filter(|k| *k != FOLD_FIELD));
        }

        for (i, record) in self.records.iter().enumerate() {
            let line = record.line().unwrap_or(i + 1);
            if let Some(violation) = record.convention_violations().into_iter().next() {
                return Err(DatasetError::format(line, violation));
            }
            let mut missing: Vec<&str> = all_keys
                .iter()
                .copied()
                .filter(|k| !record.contains(k))
                .collect();
            if !missing.is_empty() {
                missing.sort_unstable();
                return Err(DatasetError::format(
                    line,
                    format!("record is missing fields: {}", missing.join(", ")),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FIVE: &str = r#"{"id": 0, "fold": "train"}
{"id": 1, "fold": "train"}
{"id": 2, "fold": "val"}
{"id": 3, "fold": "train"}
{"id": 4, "fold": "val"}
"#;

    #[test]
    fn test_counts() {
        let ds = Dataset::from_text("five", "", FIVE, DatasetOptions::default()).unwrap();

        assert_eq!(ds.count(Some("train")).unwrap(), 3);
        assert_eq!(ds.count(Some("val")).unwrap(), 2);
        assert_eq!(ds.count(None).unwrap(), 5);
        assert!(ds.count(Some("test")).unwrap_err().is_lookup());
    }

    #[test]
    fn test_open_sets_name_and_data_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mnist.dataset");
        fs::write(&path, FIVE).unwrap();

        let ds = Dataset::open(&path, DatasetOptions::default()).unwrap();
        assert_eq!(ds.name(), "mnist");
        assert_eq!(ds.data_dir(), dir.path());
        assert_eq!(ds.count(None).unwrap(), 5);
    }

    #[test]
    fn test_open_missing_file() {
        let err =
            Dataset::open("/nonexistent/none.dataset", DatasetOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::Storage { source: None, .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_open_directory() {
        let dir = TempDir::new().unwrap();
        let err = Dataset::open(dir.path(), DatasetOptions::default()).unwrap_err();
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn test_bad_line_aborts_construction() {
        let text = "{\"id\": 0}\nnot json\n";
        let result = Dataset::from_text("bad", "", text, DatasetOptions::default());
        assert!(matches!(result, Err(DatasetError::Format { line: 2, .. })));
    }

    #[test]
    fn test_subsample_keeps_records_consistent() {
        let mut text = String::new();
        for i in 0..30 {
            text.push_str(&format!("{{\"id\": {i}}}\n"));
        }
        for i in 30..34 {
            text.push_str(&format!("{{\"id\": {i}, \"fold\": \"val\"}}\n"));
        }
        let options = DatasetOptions::default().with_seed(11).with_example_count(10);
        let ds = Dataset::from_text("sub", "", &text, options).unwrap();

        assert_eq!(ds.count(Some("train")).unwrap(), 10);
        assert_eq!(ds.count(Some("val")).unwrap(), 4);
        assert_eq!(ds.count(None).unwrap(), 14);

        // Retained records keep file order in the record sequence.
        let ids: Vec<u64> = ds
            .records()
            .iter()
            .map(|r| r.get("id").unwrap().as_u64().unwrap())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_zero_example_count_rejected() {
        let options = DatasetOptions::default().with_example_count(0);
        let result = Dataset::from_text("z", "", FIVE, options);
        assert!(matches!(result, Err(DatasetError::InvalidArgument { .. })));
    }

    #[test]
    fn test_resolve_path() {
        let text = r#"{"filename": "foo/bar.jpg"}"#;
        let ds = Dataset::from_text("p", "/data/set", text, DatasetOptions::default()).unwrap();
        let record = &ds.records()[0];
        assert_eq!(
            ds.resolve_path(record, "filename"),
            Some(PathBuf::from("/data/set/foo/bar.jpg"))
        );
    }

    #[test]
    fn test_check_conventions() {
        let good = concat!(
            "{\"filename\": \"a.jpg\", \"is_x\": true}\n",
            "{\"filename\": \"b.jpg\", \"is_x\": false, \"fold\": \"val\"}\n",
        );
        let ds = Dataset::from_text("good", "", good, DatasetOptions::default()).unwrap();
        assert!(ds.check_conventions().is_ok());

        let missing = "{\"filename\": \"a.jpg\", \"color\": \"blue\"}\n{\"filename\": \"b.jpg\"}\n";
        let ds = Dataset::from_text("missing", "", missing, DatasetOptions::default()).unwrap();
        let err = ds.check_conventions().unwrap_err();
        assert!(err.to_string().contains("color"));

        let typed = "{\"has_box\": 1}\n";
        let ds = Dataset::from_text("typed", "", typed, DatasetOptions::default()).unwrap();
        assert!(ds.check_conventions().is_err());
    }

    #[test]
    fn test_non_string_fold_reports_file_line() {
        let text = "\n\n{\"id\": 0}\n\n{\"id\": 1, \"fold\": 7}\n";
        let err = Dataset::from_text("bad", "", text, DatasetOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::Format { line: 5, .. }));
    }

    #[test]
    fn test_check_conventions_reports_file_line() {
        let text = "{\"is_x\": true}\n\n\n{\"is_x\": \"no\"}\n";
        let ds = Dataset::from_text("lines", "", text, DatasetOptions::default()).unwrap();
        assert!(matches!(
            ds.check_conventions(),
            Err(DatasetError::Format { line: 4, .. })
        ));

        // Merged records keep the line they had in their own file.
        let other = Dataset::from_text(
            "other",
            "",
            "\n{\"is_x\": false}\n",
            DatasetOptions::default(),
        )
        .unwrap();
        let merged = other.combine(&ds).unwrap();
        assert!(matches!(
            merged.check_conventions(),
            Err(DatasetError::Format { line: 4, .. })
        ));
    }
}
