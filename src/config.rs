//! Split configuration.
//!
//! [`SplitOptions`] holds the options as the host or the command line received
//! them. Nothing in it is trusted yet. [`SplitOptions::validate`] turns it into
//! a [`SplitConfig`], which is the only form the rest of the crate accepts.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use crate::{algorithm::Algorithm, error::ConfigError};

/// The default durations file, relative to the working directory.
pub const DEFAULT_DURATIONS_PATH: &str = ".test_durations";

/// Raw, unvalidated split options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Total number of groups.
    pub splits: Option<usize>,

    /// The 1-based group this run executes.
    pub group: Option<usize>,

    /// Algorithm name, [`Algorithm::default`] if unset.
    pub algorithm: Option<String>,

    /// Where durations are read from and stored to.
    pub durations_path: PathBuf,

    /// Keep notebook cells together, see [`NotebookCells`](crate::adjust::NotebookCells).
    pub notebook_compat: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            splits: None,
            group: None,
            algorithm: None,
            durations_path: PathBuf::from(DEFAULT_DURATIONS_PATH),
            notebook_compat: false,
        }
    }
}

impl SplitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_splits(self, splits: usize) -> Self {
        Self {
            splits: Some(splits),
            ..self
        }
    }

    pub fn with_group(self, group: usize) -> Self {
        Self {
            group: Some(group),
            ..self
        }
    }

    pub fn with_algorithm(self, algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: Some(algorithm.into()),
            ..self
        }
    }

    pub fn with_durations_path(self, durations_path: impl Into<PathBuf>) -> Self {
        Self {
            durations_path: durations_path.into(),
            ..self
        }
    }

    pub fn with_notebook_compat(self, notebook_compat: bool) -> Self {
        Self {
            notebook_compat,
            ..self
        }
    }

    /// Validate the options.
    ///
    /// Splitting needs both `splits` and `group`. If neither is given, splitting
    /// is simply not requested and `Ok(None)` is returned. If only one of them
    /// is given, a warning is logged and splitting stays disabled as well.
    pub fn validate(&self) -> Result<Option<SplitConfig>, ConfigError> {
        let (splits, group) = match (self.splits, self.group) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                tracing::warn!(
                    "both `splits` and `group` are required to split tests, \
                     remove `splits` or add `group`"
                );
                return Ok(None);
            }
            (None, Some(_)) => {
                tracing::warn!(
                    "both `splits` and `group` are required to split tests, \
                     remove `group` or add `splits`"
                );
                return Ok(None);
            }
            (Some(splits), Some(group)) => (splits, group),
        };

        let algorithm = match &self.algorithm {
            Some(name) => name.parse()?,
            None => Algorithm::default(),
        };

        SplitConfig::new(splits, group, algorithm)
            .map(|config| config.with_notebook_compat(self.notebook_compat))
            .map(Some)
    }
}

/// Validated split configuration.
///
/// Guarantees `1 <= group <= splits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    splits: NonZeroUsize,
    group: NonZeroUsize,
    algorithm: Algorithm,
    notebook_compat: bool,
}

impl SplitConfig {
    pub fn new(splits: usize, group: usize, algorithm: Algorithm) -> Result<Self, ConfigError> {
        let splits = NonZeroUsize::new(splits).ok_or(ConfigError::ZeroSplits)?;
        let group = NonZeroUsize::new(group)
            .filter(|group| *group <= splits)
            .ok_or(ConfigError::GroupOutOfRange {
                group,
                splits: splits.get(),
            })?;

        Ok(Self {
            splits,
            group,
            algorithm,
            notebook_compat: false,
        })
    }

    pub fn with_notebook_compat(self, notebook_compat: bool) -> Self {
        Self {
            notebook_compat,
            ..self
        }
    }

    pub fn splits(&self) -> NonZeroUsize {
        self.splits
    }

    /// The 1-based group index.
    pub fn group(&self) -> NonZeroUsize {
        self.group
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn notebook_compat(&self) -> bool {
        self.notebook_compat
    }
}

/// Resolve `path` against `base` unless it is absolute already.
pub fn resolve_durations_path(base: &Path, path: &Path) -> PathBuf {
    match path.is_absolute() {
        true => path.to_path_buf(),
        false => base.join(path),
    }
}
