//! Recording measured durations.
//!
//! The host reports every phase of every finished test as a [`ReportEvent`].
//! A [`DurationRecorder`] sums them up per test id and finally merges them
//! into an existing [`DurationTable`], which is then written back with
//! [`store::save`](super::store::save).

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender};
use serde::Deserialize;

use crate::durations::DurationTable;

/// Setup and teardown phases longer than this many seconds are not recorded.
///
/// Such phases usually measure a session scoped fixture rather than the test
/// itself, and would make the test look far more expensive than it is.
pub const SETUP_TEARDOWN_THRESHOLD: f64 = 600.0;

/// The phase of a test a [`ReportEvent`] measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

/// A single measured test phase.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportEvent {
    pub id: String,
    pub phase: Phase,

    /// Seconds.
    pub duration: f64,
}

impl ReportEvent {
    pub fn new(id: impl Into<String>, phase: Phase, duration: Duration) -> Self {
        Self {
            id: id.into(),
            phase,
            duration: duration.as_secs_f64(),
        }
    }
}

/// Accumulates measured durations per test id.
#[derive(Debug, Clone)]
pub struct DurationRecorder {
    recorded: DurationTable,
    threshold: f64,
    skipped: usize,
}

impl Default for DurationRecorder {
    fn default() -> Self {
        Self {
            recorded: DurationTable::new(),
            threshold: SETUP_TEARDOWN_THRESHOLD,
            skipped: 0,
        }
    }
}

impl DurationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_setup_teardown_threshold(self, threshold: f64) -> Self {
        Self { threshold, ..self }
    }

    /// Add `event` to its test's total.
    ///
    /// Returns whether the event was counted. Negative durations and setup or
    /// teardown phases above the threshold are skipped.
    pub fn record(&mut self, event: ReportEvent) -> bool {
        let too_long = match event.phase {
            Phase::Setup | Phase::Teardown => event.duration > self.threshold,
            Phase::Call => false,
        };
        if event.duration < 0.0 || too_long {
            tracing::debug!(
                id = %event.id,
                phase = ?event.phase,
                duration = event.duration,
                "skipping duration"
            );
            self.skipped += 1;
            return false;
        }

        let total = self.recorded.get(&event.id).unwrap_or(0.0) + event.duration;
        self.recorded.insert(event.id, total);
        true
    }

    /// Durations recorded so far.
    pub fn recorded(&self) -> &DurationTable {
        &self.recorded
    }

    /// Number of events [`record`](Self::record) refused.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_table(self) -> DurationTable {
        self.recorded
    }

    /// Merge the recorded durations into `table`.
    ///
    /// Recorded tests replace their old entry, every other entry is kept.
    pub fn merge_into(self, table: &mut DurationTable) {
        tracing::info!(
            recorded = self.recorded.len(),
            skipped = self.skipped,
            "merging recorded durations"
        );
        table.extend(self.recorded);
    }

    /// Record every event received on `receiver` until all senders are gone.
    pub fn collect(&mut self, receiver: Receiver<ReportEvent>) {
        for event in receiver {
            self.record(event);
        }
    }

    /// Move the recorder onto a collector thread.
    ///
    /// Tests running on several threads report through the returned sender.
    /// Once every clone of it is dropped, the thread ends and the handle yields
    /// the recorder.
    pub fn spawn(mut self, capacity: usize) -> (Sender<ReportEvent>, JoinHandle<DurationRecorder>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        let handle = thread::spawn(move || {
            self.collect(receiver);
            self
        });
        (sender, handle)
    }
}
