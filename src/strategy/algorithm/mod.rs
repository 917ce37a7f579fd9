//! Partitioning algorithms for test-split.
//!
//! An algorithm takes the collected items together with their estimated
//! durations and distributes them over `splits` groups. Every runner in a CI
//! matrix calls the algorithm with the same input and then keeps only its own
//! group, so an algorithm must be fully deterministic: same items, same
//! durations, same groups. No hash iteration order, no unstable sorting, no
//! randomness.
//!
//! Two algorithms are available:
//! - [`DurationBasedChunks`] cuts the input order into contiguous runs
//! - [`LeastDuration`] greedily hands the longest remaining item to the least
//!   loaded group
//!
//! [`Algorithm`] is the closed set of both and is what configuration parses
//! into. Implement [`SplitAlgorithm`] to provide another one.

use std::{fmt::Display, num::NonZeroUsize, str::FromStr};

use crate::{
    durations::{DurationTable, WorkingDurations},
    error::ConfigError,
    group::TestGroup,
    item::SplitItem,
};

mod chunks;
pub use chunks::*;

mod least;
pub use least::*;

/// A strategy for partitioning items into groups of similar total duration.
///
/// Implementations receive the items in collection order and must return
/// exactly `splits` groups where:
/// - every item is selected by exactly one group
/// - each group's `deselected` holds every other item
/// - each group's `selected` keeps the relative input order
pub trait SplitAlgorithm {
    /// The name used to select this algorithm in configuration.
    fn name(&self) -> &'static str;

    /// Partition `items` using already estimated durations.
    ///
    /// `durations[i]` belongs to `items[i]`.
    fn split_estimated<'t, T: SplitItem>(
        &self,
        splits: NonZeroUsize,
        items: &'t [T],
        durations: &WorkingDurations,
    ) -> Vec<TestGroup<'t, T>>;

    /// Estimate durations from `table` and partition `items`.
    fn split<'t, T: SplitItem>(
        &self,
        splits: NonZeroUsize,
        items: &'t [T],
        table: &DurationTable,
    ) -> Vec<TestGroup<'t, T>> {
        let durations = WorkingDurations::estimate(items, table);
        self.split_estimated(splits, items, &durations)
    }
}

/// The available algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// See [`DurationBasedChunks`].
    #[default]
    DurationBasedChunks,

    /// See [`LeastDuration`].
    LeastDuration,
}

impl Algorithm {
    /// Every algorithm, in the order of [`Self::NAMES`].
    pub const ALL: [Algorithm; 2] = [Algorithm::DurationBasedChunks, Algorithm::LeastDuration];

    /// The configuration names of all algorithms.
    pub const NAMES: [&'static str; 2] = ["duration_based_chunks", "least_duration"];
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == s)
            .ok_or_else(|| ConfigError::UnknownAlgorithm { name: s.to_string() })
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl SplitAlgorithm for Algorithm {
    fn name(&self) -> &'static str {
        match self {
            Algorithm::DurationBasedChunks => DurationBasedChunks.name(),
            Algorithm::LeastDuration => LeastDuration.name(),
        }
    }

    fn split_estimated<'t, T: SplitItem>(
        &self,
        splits: NonZeroUsize,
        items: &'t [T],
        durations: &WorkingDurations,
    ) -> Vec<TestGroup<'t, T>> {
        match self {
            Algorithm::DurationBasedChunks => {
                DurationBasedChunks.split_estimated(splits, items, durations)
            }
            Algorithm::LeastDuration => LeastDuration.split_estimated(splits, items, durations),
        }
    }
}
