//! Historical test durations.
//!
//! A [`DurationTable`] maps test ids to how long they took the last time they
//! were recorded. It is loaded once per run (see [`store`]) and never changed by
//! the splitter.
//!
//! The splitter does not use the table directly. It first turns it into
//! [`WorkingDurations`]: one estimate per current item, where items without
//! history get the average of the known durations of the *current* items.
//! Entries for tests that no longer exist are ignored for that average so a
//! deleted slow test does not make every new test look slow.

use std::{
    collections::{BTreeMap, btree_map},
    ops::Index,
};

use serde::{Deserialize, Serialize};

use crate::item::SplitItem;

mod pattern;

pub mod recorder;
pub use recorder::{DurationRecorder, Phase, ReportEvent};

pub mod store;

/// The estimate used for every item when none of the current items has history.
pub const DEFAULT_DURATION: f64 = 1.0;

/// Test id to duration in seconds.
///
/// Backed by a [`BTreeMap`], so iteration and serialization order only depend
/// on the ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationTable(BTreeMap<String, f64>);

impl DurationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Insert or overwrite the duration for `id`, returning the old one.
    pub fn insert(&mut self, id: impl Into<String>, duration: f64) -> Option<f64> {
        self.0.insert(id.into(), duration)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for DurationTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>> Extend<(K, f64)> for DurationTable {
    fn extend<I: IntoIterator<Item = (K, f64)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl IntoIterator for DurationTable {
    type Item = (String, f64);
    type IntoIter = btree_map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'d> IntoIterator for &'d DurationTable {
    type Item = (&'d String, &'d f64);
    type IntoIter = btree_map::Iter<'d, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The per-item durations the algorithms actually work with.
///
/// `WorkingDurations[i]` is the estimate for `items[i]` of the slice it was
/// built from. Duplicate ids are looked up independently per position.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingDurations {
    durations: Vec<f64>,
    fallback: f64,
}

impl WorkingDurations {
    /// Estimate a duration for every item.
    ///
    /// Items found in `table` keep their recorded duration. All others get the
    /// mean over the recorded durations of the current items, or
    /// [`DEFAULT_DURATION`] if none of them was recorded.
    pub fn estimate<T: SplitItem>(items: &[T], table: &DurationTable) -> Self {
        // Each distinct id counts once for the average, even if it appears
        // multiple times in `items`.
        let relevant: BTreeMap<&str, f64> = items
            .iter()
            .filter_map(|item| {
                let id = item.id();
                table.get(id).map(|duration| (id, duration))
            })
            .collect();

        let fallback = match relevant.is_empty() {
            true => DEFAULT_DURATION,
            false => relevant.values().sum::<f64>() / relevant.len() as f64,
        };

        let durations = items
            .iter()
            .map(|item| table.get(item.id()).unwrap_or(fallback))
            .collect();

        Self {
            durations,
            fallback,
        }
    }

    /// The value given to items without history.
    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn total(&self) -> f64 {
        self.durations.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.durations
    }
}

impl Index<usize> for WorkingDurations {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.durations[index]
    }
}
