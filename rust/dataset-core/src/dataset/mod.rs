// rust/dataset-core/src/dataset/mod.rs

//! Fold-partitioned datasets and batch sampling.
//!
//! A `.dataset` file holds one JSON object per line, optionally gzipped.
//! Loading parses every line into a `Record`, partitions records into folds
//! by their `fold` field (default `"train"`), and optionally keeps only a
//! random subset of each fold.
//!
//! Two sampling protocols read from a fold:
//!
//! - `get_example` / `get_batch`: independent uniform draws with optional
//!   rejection on the `label` field.
//! - `get_all_batches`: one epoch that visits every record once, in order
//!   or in a random permutation, cut into fixed-size batches.
//!
//! # Example
//!
//! ```no_run
//! use dataset_core::dataset::{Dataset, DatasetOptions};
//!
//! let dataset = Dataset::open("mnist.dataset", DatasetOptions::default())?;
//! println!("{} training examples", dataset.count(Some("train"))?);
//!
//! for batch in dataset.get_all_batches("train", 32, true, false)? {
//!     // hand batch.records to converters
//! }
//!
//! let merged = dataset.combine(&Dataset::open("svhn.dataset", DatasetOptions::default())?)?;
//! assert_eq!(merged.name(), "mnist-svhn");
//! # Ok::<(), dataset_core::DatasetError>(())
//! ```

mod batch;
mod codec;
mod epoch;
mod fold;
mod handle;
mod merge;
mod record;
mod sampler;

pub use batch::Batch;
pub use codec::{decode, parse_records, Compression, GZIP_MAGIC};
pub use epoch::EpochBatches;
pub use fold::{FoldIndex, DEFAULT_FOLD};
pub use handle::{Dataset, DatasetOptions};
pub use record::{Record, BOOLEAN_PREFIXES, FILENAME_SUFFIX, FOLD_FIELD, LABEL_FIELD};
