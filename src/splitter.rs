use std::path::Path;

use crate::{
    adjust::{GroupAdjuster, NoAdjust, NotebookCells},
    algorithm::SplitAlgorithm,
    config::SplitConfig,
    durations::{DurationTable, store},
    error::Result,
    group::TestGroup,
    item::SplitItem,
};

/// Everything one run needs to pick its tests.
///
/// A `Splitter` is built once per invocation from a validated [`SplitConfig`]
/// and the duration table. It holds no other state, so every runner that builds
/// one from the same table and calls [`split`](Self::split) with the same items
/// gets the same partition.
#[derive(Debug, Clone)]
pub struct Splitter {
    config: SplitConfig,
    durations: DurationTable,
}

/// The tests one runner executes and the ones it skips.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'t, T> {
    pub selected: Vec<&'t T>,
    pub deselected: Vec<&'t T>,

    /// Estimated run time of `selected` as computed by the algorithm, before
    /// any adjustment.
    pub duration: f64,

    /// The 1-based group this selection belongs to.
    pub group: usize,
    pub splits: usize,
}

impl<'t, T> From<(TestGroup<'t, T>, &SplitConfig)> for Selection<'t, T> {
    fn from((group, config): (TestGroup<'t, T>, &SplitConfig)) -> Self {
        Self {
            selected: group.selected,
            deselected: group.deselected,
            duration: group.duration,
            group: config.group().get(),
            splits: config.splits().get(),
        }
    }
}

impl Splitter {
    pub fn new(config: SplitConfig, durations: DurationTable) -> Self {
        if durations.is_empty() {
            tracing::warn!(
                "no test durations found, tests are split evenly until durations are stored"
            );
        }
        Self { config, durations }
    }

    /// Read the duration table from `path` and build a splitter.
    pub fn load(config: SplitConfig, path: impl AsRef<Path>) -> Result<Self> {
        let durations = store::load(path)?;
        Ok(Self::new(config, durations))
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub fn durations(&self) -> &DurationTable {
        &self.durations
    }

    /// Partition `items` into all groups, without selecting or adjusting.
    pub fn groups<'t, T: SplitItem>(&self, items: &'t [T]) -> Vec<TestGroup<'t, T>> {
        let groups = self
            .config
            .algorithm()
            .split(self.config.splits(), items, &self.durations);
        for (idx, group) in groups.iter().enumerate() {
            tracing::debug!(
                group = idx + 1,
                tests = group.len(),
                duration = group.duration,
                "estimated group"
            );
        }
        groups
    }

    /// Select this run's group.
    ///
    /// Applies [`NotebookCells`] adjustment if the config asks for it.
    pub fn split<'t, T: SplitItem>(&self, items: &'t [T]) -> Selection<'t, T> {
        match self.config.notebook_compat() {
            true => self.split_with(items, &NotebookCells::adjuster()),
            false => self.split_with(items, &NoAdjust),
        }
    }

    /// Select this run's group and post-process it with `adjuster`.
    pub fn split_with<'t, T, A>(&self, items: &'t [T], adjuster: &A) -> Selection<'t, T>
    where
        T: SplitItem,
        A: GroupAdjuster,
    {
        let index = self.config.group().get() - 1;
        let mut group = self
            .groups(items)
            .into_iter()
            .nth(index)
            .unwrap_or_default();
        adjuster.adjust(&mut group, items);

        let selection = Selection::from((group, &self.config));
        tracing::info!(
            algorithm = %self.config.algorithm(),
            selected = selection.selected.len(),
            deselected = selection.deselected.len(),
            duration = selection.duration,
            "running group {}/{}",
            selection.group,
            selection.splits
        );
        selection
    }
}
