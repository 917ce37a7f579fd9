//! # test-split
//!
//! Command line front end for splitting a test suite across CI runners.
//!
//! ```bash
//! # Run the second of four groups
//! pytest --collect-only -q | test-split split --splits 4 --group 2 | xargs pytest
//!
//! # Merge the durations every runner stored
//! test-split combine --durations-pattern 'artifacts/*/.test_durations'
//!
//! # Show the ten slowest tests
//! test-split slowest
//! ```

use std::{
    env,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use test_split::{
    Splitter,
    config::{self, DEFAULT_DURATIONS_PATH, SplitOptions},
    durations::{DurationRecorder, ReportEvent, store},
    item::NodeId,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "test-split",
    about = "Split a test suite into groups of roughly equal runtime",
    version
)]
struct Cli {
    /// Log filter, overridden by `RUST_LOG`. Logs are written to stderr.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read test ids from stdin and print the ids of one group.
    Split {
        /// Total number of groups.
        #[arg(long)]
        splits: Option<usize>,

        /// The group to print, starting at 1.
        #[arg(long)]
        group: Option<usize>,

        /// duration_based_chunks or least_duration.
        #[arg(long)]
        algorithm: Option<String>,

        /// Recorded durations.
        #[arg(long, default_value = DEFAULT_DURATIONS_PATH)]
        durations_path: PathBuf,

        /// Keep the cells of a notebook in one group.
        #[arg(long)]
        notebook_compat: bool,
    },

    /// Read report events as JSON lines from stdin and store their durations.
    Record {
        #[arg(long, default_value = DEFAULT_DURATIONS_PATH)]
        durations_path: PathBuf,

        /// Events buffered between the reader and the recorder.
        #[arg(long, default_value_t = 256)]
        buffer: usize,
    },

    /// Print the slowest recorded tests.
    Slowest {
        #[arg(long, default_value = DEFAULT_DURATIONS_PATH)]
        durations_path: PathBuf,

        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },

    /// Merge partial durations files into one.
    Combine {
        /// The combined output.
        #[arg(long, default_value = DEFAULT_DURATIONS_PATH)]
        durations_path: PathBuf,

        /// Files to merge, `*` and `?` match within a path component.
        #[arg(long, default_value = "*/.test_durations")]
        durations_pattern: String,

        /// Let entries already in the output win over the merged files.
        #[arg(long)]
        keep_original: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let cwd = env::current_dir().context("could not determine working directory")?;
    match cli.command {
        Commands::Split {
            splits,
            group,
            algorithm,
            durations_path,
            notebook_compat,
        } => {
            let options = SplitOptions {
                splits,
                group,
                algorithm,
                durations_path: config::resolve_durations_path(&cwd, &durations_path),
                notebook_compat,
            };
            split(&options)
        }
        Commands::Record {
            durations_path,
            buffer,
        } => record(&config::resolve_durations_path(&cwd, &durations_path), buffer),
        Commands::Slowest {
            durations_path,
            count,
        } => slowest(&config::resolve_durations_path(&cwd, &durations_path), count),
        Commands::Combine {
            durations_path,
            durations_pattern,
            keep_original,
        } => {
            let output = config::resolve_durations_path(&cwd, &durations_path);
            store::combine(&durations_pattern, output, keep_original)?;
            Ok(())
        }
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn read_ids() -> anyhow::Result<Vec<NodeId>> {
    let mut ids = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("could not read test ids from stdin")?;
        let id = line.trim();
        if !id.is_empty() {
            ids.push(NodeId::from(id));
        }
    }
    Ok(ids)
}

fn split(options: &SplitOptions) -> anyhow::Result<()> {
    let ids = read_ids()?;
    let mut stdout = io::stdout().lock();

    let Some(config) = options.validate()? else {
        for id in &ids {
            writeln!(stdout, "{id}")?;
        }
        return Ok(());
    };

    let durations = store::load_or_default(&options.durations_path)?;
    let selection = Splitter::new(config, durations).split(&ids);
    for id in selection.selected {
        writeln!(stdout, "{id}")?;
    }
    Ok(())
}

fn record(path: &Path, buffer: usize) -> anyhow::Result<()> {
    let (sender, collector) = DurationRecorder::new().spawn(buffer);
    for (idx, line) in io::stdin().lock().lines().enumerate() {
        let line = line.context("could not read report events from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: ReportEvent = serde_json::from_str(&line)
            .with_context(|| format!("invalid report event on line {}", idx + 1))?;
        sender.send(event)?;
    }
    drop(sender);

    let recorder = collector
        .join()
        .map_err(|_| anyhow::anyhow!("duration recorder panicked"))?;
    let mut table = store::load_or_default(path)?;
    recorder.merge_into(&mut table);
    store::save(path, &table)?;
    Ok(())
}

fn slowest(path: &Path, count: usize) -> anyhow::Result<()> {
    let table = store::load(path)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "\n[test-split] {count} slowest tests:")?;
    for (id, duration) in store::slowest(&table, count) {
        writeln!(stdout, "{duration:.2} {id}")?;
    }
    Ok(())
}
