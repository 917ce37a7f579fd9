use crate::item::SplitItem;

/// One of the `splits` groups produced by a [`SplitAlgorithm`](crate::algorithm::SplitAlgorithm).
///
/// All groups of one partition are produced together. Their `selected` lists
/// are pairwise disjoint and together contain every input item exactly once.
/// For each group, `deselected` holds every item that is not `selected`.
#[derive(Debug, Clone, PartialEq)]
pub struct TestGroup<'t, T: ?Sized> {
    /// The items this group runs, in input order.
    pub selected: Vec<&'t T>,

    /// The items this group skips. Order carries no meaning.
    pub deselected: Vec<&'t T>,

    /// Estimated run time of `selected` in seconds.
    pub duration: f64,
}

impl<'t, T: ?Sized> TestGroup<'t, T> {
    pub fn new() -> Self {
        Self {
            selected: Vec::new(),
            deselected: Vec::new(),
            duration: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

impl<'t, T: ?Sized> Default for TestGroup<'t, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t, T: SplitItem + ?Sized> TestGroup<'t, T> {
    /// Ids of the selected items, in order.
    pub fn selected_ids(&self) -> Vec<&'t str> {
        self.selected.iter().map(|&item| item.id()).collect()
    }

    /// Ids of the deselected items, in stored order.
    pub fn deselected_ids(&self) -> Vec<&'t str> {
        self.deselected.iter().map(|&item| item.id()).collect()
    }
}
