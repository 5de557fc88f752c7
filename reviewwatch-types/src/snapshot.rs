//! StatusSnapshot - the result of one fetch.

use crate::{Cursor, MonitoredItem};

/// The ordered items returned by one fetch, tagged with the cursor used.
///
/// A snapshot belongs to the cycle that produced it; the poll loop keeps the
/// last accepted one and replaces it wholesale.
///
/// # Example
///
/// ```rust
/// use reviewwatch_types::{Cursor, StatusSnapshot};
///
/// let snapshot = StatusSnapshot::builder()
///     .cursor(Cursor::from_secs(1_581_604_970))
///     .server_time(Cursor::from_secs(1_581_604_980))
///     .item("hw.zip", "reviewing")
///     .build();
///
/// assert_eq!(snapshot.get("hw.zip").unwrap().status, "reviewing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSnapshot {
    /// Cursor the fetch was issued with.
    pub cursor: Cursor,

    /// Server time reported alongside the items, if any.
    pub server_time: Option<Cursor>,

    /// Items in the order the endpoint returned them.
    pub items: Vec<MonitoredItem>,
}

impl StatusSnapshot {
    /// Create a snapshot from fetched items.
    pub fn new(cursor: Cursor, items: Vec<MonitoredItem>) -> Self {
        Self {
            cursor,
            server_time: None,
            items,
        }
    }

    /// Set the server time reported with the response.
    pub fn with_server_time(mut self, server_time: Option<Cursor>) -> Self {
        self.server_time = server_time;
        self
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> StatusSnapshotBuilder {
        StatusSnapshotBuilder::new()
    }

    /// Check if the snapshot has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items in the snapshot.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Find an item by name.
    pub fn get(&self, name: &str) -> Option<&MonitoredItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Iterate over items in response order.
    pub fn iter(&self) -> impl Iterator<Item = &MonitoredItem> {
        self.items.iter()
    }
}

/// Builder for constructing `StatusSnapshot` instances.
#[derive(Debug, Default)]
pub struct StatusSnapshotBuilder {
    cursor: Cursor,
    server_time: Option<Cursor>,
    items: Vec<MonitoredItem>,
}

impl StatusSnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cursor the snapshot was fetched with.
    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Set the server time.
    pub fn server_time(mut self, server_time: Cursor) -> Self {
        self.server_time = Some(server_time);
        self
    }

    /// Append an item with no metadata.
    pub fn item(mut self, name: impl Into<String>, status: impl Into<String>) -> Self {
        self.items.push(MonitoredItem::new(name, status));
        self
    }

    /// Append a pre-built item.
    pub fn monitored(mut self, item: MonitoredItem) -> Self {
        self.items.push(item);
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> StatusSnapshot {
        StatusSnapshot {
            cursor: self.cursor,
            server_time: self.server_time,
            items: self.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder_keeps_order() {
        let snapshot = StatusSnapshot::builder()
            .cursor(Cursor::from_secs(10))
            .item("b", "approved")
            .item("a", "reviewing")
            .monitored(MonitoredItem::new("c", "rejected").with_comment("fix tests"))
            .build();

        let names: Vec<_> = snapshot.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(snapshot.cursor, Cursor::from_secs(10));
        assert_eq!(snapshot.server_time, None);
        assert_eq!(
            snapshot.get("c").unwrap().reviewer_comment.as_deref(),
            Some("fix tests")
        );
    }

    #[test]
    fn test_snapshot_empty() {
        let snapshot = StatusSnapshot::new(Cursor::UNCONDITIONAL, Vec::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
        assert!(snapshot.get("missing").is_none());
    }
}
