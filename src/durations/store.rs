//! Reading and writing duration files.
//!
//! Durations are stored as a JSON object mapping test ids to seconds:
//!
//! ```json
//! {"tests/test_io.py::test_read": 0.52, "tests/test_io.py::test_write": 1.3}
//! ```
//!
//! Older files store a list of `[id, seconds]` pairs instead. Both shapes are
//! accepted when reading and normalized into a [`DurationTable`], files are
//! always written as an object.

use std::{
    cmp::Ordering,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    durations::{DurationTable, pattern::PathPattern},
    error::DurationsError,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredDurations {
    Table(DurationTable),
    Pairs(Vec<(String, f64)>),
}

impl From<StoredDurations> for DurationTable {
    fn from(value: StoredDurations) -> Self {
        match value {
            StoredDurations::Table(table) => table,
            StoredDurations::Pairs(pairs) => pairs.into_iter().collect(),
        }
    }
}

/// Parse durations in either the object or the legacy pair-list shape.
pub fn parse(json: &str) -> Result<DurationTable, serde_json::Error> {
    serde_json::from_str::<StoredDurations>(json).map(DurationTable::from)
}

/// Read a durations file.
pub fn load(path: impl AsRef<Path>) -> Result<DurationTable, DurationsError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| DurationsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse(&json).map_err(|source| DurationsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), entries = table.len(), "read durations");
    Ok(table)
}

/// Read a durations file, treating a missing file as an empty table.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<DurationTable, DurationsError> {
    match load(path) {
        Err(DurationsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            Ok(DurationTable::default())
        }
        res => res,
    }
}

/// Write `table` as a JSON object.
pub fn save(path: impl AsRef<Path>, table: &DurationTable) -> Result<(), DurationsError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(table).map_err(|source| DurationsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| DurationsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), entries = table.len(), "stored durations");
    Ok(())
}

/// The `count` slowest tests, slowest first.
///
/// Equal durations are ordered by id.
pub fn slowest(table: &DurationTable, count: usize) -> Vec<(&str, f64)> {
    let mut tests: Vec<(&str, f64)> = table
        .iter()
        .map(|(id, duration)| (id.as_str(), *duration))
        .collect();
    tests.sort_by(|(a_id, a), (b_id, b)| match b.total_cmp(a) {
        Ordering::Equal => a_id.cmp(b_id),
        ordering => ordering,
    });
    tests.truncate(count);
    tests
}

/// What [`combine`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineSummary {
    /// The files matched by the pattern, in merge order.
    pub files: Vec<PathBuf>,

    /// Entries in the written table.
    pub entries: usize,
}

/// Merge all durations files matching `pattern` into `output`.
///
/// Every runner of a split CI job usually stores durations only for the tests
/// it ran. This combines those partial files into one table. Files are merged
/// in path order, later files win. A file that cannot be read is logged and
/// skipped. With `keep_original`, the current content of `output` is merged
/// last and wins over the partial files.
///
/// If nothing matches, `output` is left alone and `Ok(None)` is returned.
pub fn combine(
    pattern: &str,
    output: impl AsRef<Path>,
    keep_original: bool,
) -> Result<Option<CombineSummary>, DurationsError> {
    let output = output.as_ref();
    let files = PathPattern::new(pattern)?.matches();
    if files.is_empty() {
        tracing::warn!(pattern, "no durations file matches the pattern");
        return Ok(None);
    }

    let mut combined = DurationTable::new();
    for file in &files {
        match load(file) {
            Ok(table) => combined.extend(table),
            Err(err) => tracing::warn!("skipping {}: {err}", file.display()),
        }
    }

    if keep_original {
        combined.extend(load(output)?);
    }

    save(output, &combined)?;
    tracing::info!(
        files = files.len(),
        entries = combined.len(),
        "combined durations"
    );

    Ok(Some(CombineSummary {
        entries: combined.len(),
        files,
    }))
}
