use std::num::NonZeroUsize;

use crate::{
    algorithm::SplitAlgorithm, durations::WorkingDurations, group::TestGroup, item::SplitItem,
};

/// Cut the input order into `splits` contiguous runs of similar duration.
///
/// The target per group is the total estimated duration divided by `splits`.
/// Items are walked in input order and added to the current group. Before an
/// item is added, the algorithm moves on to the next group if the current one
/// already reached the target. The last group takes whatever is left.
///
/// This never reorders anything, so group `i` always holds a contiguous slice of
/// the collected items. The price is balance: a single item that is much longer
/// than the target is not isolated, it simply inflates the group it lands in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DurationBasedChunks;

impl DurationBasedChunks {
    pub fn new() -> Self {
        Self
    }
}

impl SplitAlgorithm for DurationBasedChunks {
    fn name(&self) -> &'static str {
        "duration_based_chunks"
    }

    fn split_estimated<'t, T: SplitItem>(
        &self,
        splits: NonZeroUsize,
        items: &'t [T],
        durations: &WorkingDurations,
    ) -> Vec<TestGroup<'t, T>> {
        let splits = splits.get();
        let time_per_group = durations.total() / splits as f64;

        let mut groups: Vec<TestGroup<'t, T>> = (0..splits).map(|_| TestGroup::new()).collect();
        let mut group_idx = 0;
        for (item, &item_duration) in items.iter().zip(durations.as_slice()) {
            if groups[group_idx].duration >= time_per_group && group_idx + 1 < splits {
                group_idx += 1;
            }

            for (idx, group) in groups.iter_mut().enumerate() {
                match idx == group_idx {
                    true => {
                        group.selected.push(item);
                        group.duration += item_duration;
                    }
                    false => group.deselected.push(item),
                }
            }
        }

        groups
    }
}
