use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    num::NonZeroUsize,
};

use crate::{
    algorithm::SplitAlgorithm, durations::WorkingDurations, group::TestGroup, item::SplitItem,
};

/// Hand the longest remaining item to the group with the least total so far.
///
/// This is the classic longest-processing-time-first heuristic. Items are
/// visited in a total order that does not depend on the input order:
/// 1. longest estimated duration first
/// 2. then by [`SplitItem::sort_key`], ascending
/// 3. then by input position
///
/// Each item goes to the group with the smallest accumulated duration. If two
/// groups are tied, the one with the lower index wins. Afterwards every group's
/// `selected` list is put back into input order.
///
/// Because of the total order, two runners that collected the same items in a
/// different order still compute the same groups.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LeastDuration;

impl LeastDuration {
    pub fn new() -> Self {
        Self
    }
}

/// Heap entry, ordered by accumulated duration and then group index.
#[derive(Debug, Clone, Copy)]
struct GroupLoad {
    duration: f64,
    index: usize,
}

impl PartialEq for GroupLoad {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupLoad {}

impl PartialOrd for GroupLoad {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupLoad {
    fn cmp(&self, other: &Self) -> Ordering {
        self.duration
            .total_cmp(&other.duration)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl SplitAlgorithm for LeastDuration {
    fn name(&self) -> &'static str {
        "least_duration"
    }

    fn split_estimated<'t, T: SplitItem>(
        &self,
        splits: NonZeroUsize,
        items: &'t [T],
        durations: &WorkingDurations,
    ) -> Vec<TestGroup<'t, T>> {
        let splits = splits.get();

        let mut order: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(position, item)| (position, item.sort_key()))
            .collect();
        order.sort_by(|(a, a_key), (b, b_key)| {
            durations[*b]
                .total_cmp(&durations[*a])
                .then_with(|| a_key.cmp(b_key))
                .then_with(|| a.cmp(b))
        });

        let mut selected: Vec<Vec<usize>> = vec![Vec::new(); splits];
        let mut groups: Vec<TestGroup<'t, T>> = (0..splits).map(|_| TestGroup::new()).collect();
        let mut heap: BinaryHeap<Reverse<GroupLoad>> = (0..splits)
            .map(|index| {
                Reverse(GroupLoad {
                    duration: 0.0,
                    index,
                })
            })
            .collect();

        for (position, _) in order {
            let Some(mut entry) = heap.peek_mut() else {
                break;
            };
            let least = &mut entry.0;

            let item = &items[position];
            selected[least.index].push(position);
            for (idx, group) in groups.iter_mut().enumerate() {
                if idx != least.index {
                    group.deselected.push(item);
                }
            }

            // `entry` moves to its new place in the heap when dropped
            least.duration += durations[position];
            groups[least.index].duration = least.duration;
        }

        for (group, mut positions) in groups.iter_mut().zip(selected) {
            positions.sort();
            group.selected = positions.into_iter().map(|position| &items[position]).collect();
        }

        groups
    }
}
