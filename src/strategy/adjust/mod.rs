//! Group boundary adjustment for test-split.
//!
//! Some tests only work when run together with their siblings. The cells of a
//! notebook are the typical example: cell 0 imports everything and cell 3 fails
//! with a name error if it runs without it. A partition algorithm knows nothing
//! about that and may cut such a unit in half at the edge of a group.
//!
//! An adjuster fixes up the one group a runner is about to execute, after the
//! partition was computed. It may move items between `selected` and
//! `deselected` but never adds or removes items, and it leaves the group's
//! estimated duration alone.
//!
//! Implement [`GroupAdjuster`] to define an adjustment strategy. The
//! [`BoundaryAdjuster`] keeps units defined by an [`AtomicUnits`] strategy in
//! one piece, [`NoAdjust`] leaves groups untouched.

use crate::{group::TestGroup, item::SplitItem};

mod no;
pub use no::*;

mod notebook;
pub use notebook::*;

/// A strategy for post-processing a single selected group.
pub trait GroupAdjuster {
    /// Adjust `group` in place.
    ///
    /// `items` is the full collected item slice the partition was computed
    /// from, not only the items of this group.
    fn adjust<'t, T: SplitItem>(&self, group: &mut TestGroup<'t, T>, items: &'t [T]);
}

/// Decides which items form units that must not be split.
///
/// Two items belong to the same unit if they produce the same unit key. Items
/// that produce no key are not part of any unit.
pub trait AtomicUnits {
    /// Return the unit key for a test id, or `None` if the test is not part of
    /// a monitored unit.
    fn unit_key<'i>(&self, id: &'i str) -> Option<&'i str>;
}

impl<F> AtomicUnits for F
where
    F: for<'i> Fn(&'i str) -> Option<&'i str>,
{
    fn unit_key<'i>(&self, id: &'i str) -> Option<&'i str> {
        self(id)
    }
}

/// Keep atomic units at the edges of a group in one piece.
///
/// If the first selected item belongs to a unit that started in an earlier
/// group, the unit's items are handed back, that earlier group owns the unit.
/// If the last selected item belongs to a unit that continues in a later group,
/// the rest of the unit is pulled in. Runners applying this to their own group
/// of the same partition therefore agree on who runs which unit.
///
/// Both edges are checked independently. A group starting with an item that
/// is not part of any unit still pulls in the rest of a unit it ends with.
#[derive(Debug, Default, Clone)]
pub struct BoundaryAdjuster<Units> {
    units: Units,
}

impl<Units: AtomicUnits> BoundaryAdjuster<Units> {
    pub fn new(units: Units) -> Self {
        Self { units }
    }

    /// All items of `key`'s unit, in input order.
    fn siblings<'t, T: SplitItem>(&self, key: &str, items: &'t [T]) -> Vec<&'t T> {
        items
            .iter()
            .filter(|item| self.units.unit_key(item.id()) == Some(key))
            .collect()
    }
}

impl<Units: AtomicUnits> GroupAdjuster for BoundaryAdjuster<Units> {
    fn adjust<'t, T: SplitItem>(&self, group: &mut TestGroup<'t, T>, items: &'t [T]) {
        let Some(&first) = group.selected.first() else {
            return;
        };

        if let Some(key) = self.units.unit_key(first.id()) {
            let siblings = self.siblings(key, items);
            if siblings.first().map(|sibling| sibling.id()) != Some(first.id()) {
                let (moved, kept): (Vec<&'t T>, Vec<&'t T>) = group
                    .selected
                    .iter()
                    .copied()
                    .partition(|item| self.units.unit_key(item.id()) == Some(key));
                tracing::debug!(unit = key, moved = moved.len(), "handing split unit back");
                group.selected = kept;
                group.deselected.extend(moved);
            }
        }

        let Some(&last) = group.selected.last() else {
            return;
        };
        let Some(key) = self.units.unit_key(last.id()) else {
            return;
        };

        let siblings = self.siblings(key, items);
        if siblings.last().map(|sibling| sibling.id()) != Some(last.id()) {
            let mut moved = 0;
            for sibling in siblings {
                let position = group
                    .deselected
                    .iter()
                    .position(|item| item.id() == sibling.id());
                if let Some(position) = position {
                    let item = group.deselected.remove(position);
                    group.selected.push(item);
                    moved += 1;
                }
            }
            tracing::debug!(unit = key, moved, "pulling in rest of split unit");
        }
    }
}
