use crate::adjust::{AtomicUnits, BoundaryAdjuster};

/// Treats the cells of one notebook file as an atomic unit.
///
/// Notebook test ids look like `path/to/book.ipynb::Cell 3`. The unit key is the
/// file path in front of the first `::`, and only paths ending in `.ipynb` are
/// considered.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct NotebookCells;

impl NotebookCells {
    pub const EXTENSION: &'static str = ".ipynb";
    pub const SEPARATOR: &'static str = "::";

    pub fn new() -> Self {
        Self
    }

    /// A [`BoundaryAdjuster`] keeping notebooks in one piece.
    pub fn adjuster() -> BoundaryAdjuster<NotebookCells> {
        BoundaryAdjuster::new(NotebookCells)
    }
}

impl AtomicUnits for NotebookCells {
    fn unit_key<'i>(&self, id: &'i str) -> Option<&'i str> {
        let path = id.split(Self::SEPARATOR).next().unwrap_or(id);
        path.ends_with(Self::EXTENSION).then_some(path)
    }
}
