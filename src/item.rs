use std::borrow::Cow;

/// Something the host runner collected and wants to split.
///
/// The splitter never looks inside an item. It only uses [`id`](SplitItem::id)
/// to look up historical durations and to compare items with each other, and it
/// hands the items back by reference so the host can keep correlating them by
/// identity.
///
/// Within one input slice ids are expected to be unique.
pub trait SplitItem {
    /// The identifier used as key into a [`DurationTable`](crate::durations::DurationTable).
    fn id(&self) -> &str;

    /// The textual rendering used to order items of equal duration.
    ///
    /// Defaults to the id. Runners on different machines must produce the same
    /// key for the same item, otherwise they will disagree on the groups.
    fn sort_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.id())
    }
}

impl SplitItem for str {
    fn id(&self) -> &str {
        self
    }
}

impl SplitItem for &str {
    fn id(&self) -> &str {
        self
    }
}

impl SplitItem for String {
    fn id(&self) -> &str {
        self.as_str()
    }
}

impl SplitItem for Cow<'_, str> {
    fn id(&self) -> &str {
        self.as_ref()
    }
}

/// A plain test identifier, e.g. `tests/test_io.py::test_read`.
///
/// This is what the command line tool splits, hosts with richer item types
/// implement [`SplitItem`] themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl SplitItem for NodeId {
    fn id(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
