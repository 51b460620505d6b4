//! Dataset Inspector
//!
//! Loads a `.dataset` file and reports its folds and how an epoch over the
//! selected fold would be batched.
//!
//! # Usage
//!
//! ```bash
//! # Summarize a dataset with default settings
//! dataset-inspect data/mnist.dataset
//!
//! # Plan epochs of 32 over the validation fold, keeping the partial batch
//! dataset-inspect data/mnist.dataset --fold val --batch-size 32 --last-batch
//!
//! # Merge two datasets and check field conventions
//! dataset-inspect data/mnist.dataset --merge data/svhn.dataset --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dataset_core::config::LoaderConfig;
use dataset_core::storage::LocalStorage;
use dataset_core::{Dataset, DatasetOptions, Result};

/// Dataset Inspector
#[derive(Parser, Debug)]
#[command(name = "dataset-inspect")]
#[command(about = "Report fold sizes and epoch batch counts for a .dataset file")]
struct Args {
    /// Path to the .dataset file (plain or gzipped)
    path: PathBuf,

    /// Additional dataset to merge onto the first one
    #[arg(long)]
    merge: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fold to plan batches for
    #[arg(short, long)]
    fold: Option<String>,

    /// Records per batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Keep at most this many random examples per fold
    #[arg(long)]
    example_count: Option<usize>,

    /// Seed for the dataset's random source
    #[arg(long)]
    seed: Option<u64>,

    /// Count the trailing partial batch
    #[arg(long)]
    last_batch: bool,

    /// Check that every record carries the same fields
    #[arg(long)]
    check: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = tracing_subscriber::filter::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<LoaderConfig> {
    let mut config = match &args.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    }
    .with_env_overrides();

    if let Some(fold) = &args.fold {
        config.loader.fold = fold.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.loader.batch_size = batch_size;
    }
    if args.example_count.is_some() {
        config.loader.example_count = args.example_count;
    }
    if args.seed.is_some() {
        config.loader.seed = args.seed;
    }
    if args.last_batch {
        config.loader.last_batch = true;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let storage = LocalStorage::new(&config.storage);

    let mut dataset = Dataset::open_with(&storage, &args.path, DatasetOptions::from(&config))?;
    for other in &args.merge {
        let other = Dataset::open_with(&storage, other, DatasetOptions::from(&config))?;
        dataset = dataset.combine(&other)?;
    }

    println!("{} ({})", dataset.name(), dataset.data_dir().display());
    println!("  examples: {}", dataset.count(None)?);
    for fold in dataset.fold_names() {
        println!("  fold {:<12} {}", fold, dataset.count(Some(fold))?);
    }

    let batch = &config.loader;
    let epoch = dataset.get_all_batches(&batch.fold, batch.batch_size, false, batch.last_batch)?;
    println!(
        "  epoch over '{}': {} batches of {} ({} records)",
        batch.fold,
        epoch.planned_batches(),
        batch.batch_size,
        epoch.remaining_records()
    );

    if args.check {
        dataset.check_conventions()?;
        println!("  field conventions: ok");
    }

    Ok(())
}
