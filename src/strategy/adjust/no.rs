use crate::{adjust::GroupAdjuster, group::TestGroup, item::SplitItem};

/// A [`GroupAdjuster`] that leaves every group as the algorithm produced it.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct NoAdjust;

impl NoAdjust {
    pub fn new() -> Self {
        Self
    }
}

impl GroupAdjuster for NoAdjust {
    fn adjust<'t, T: SplitItem>(&self, _: &mut TestGroup<'t, T>, _: &'t [T]) {}
}
