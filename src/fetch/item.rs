//! A stripped-down feed item.

use std::fmt;

/// One unit of fetched content.
///
/// Items are immutable once produced. Identity is the [`guid`](Item::guid):
/// the coordinator uses it for deduplication and assumes (does not verify)
/// that it is unique within a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    /// Display title.
    pub title: String,
    /// Label of the source that produced the item.
    pub channel: String,
    /// Globally unique identity within a source.
    pub guid: String,
}

impl Item {
    /// Creates a new item.
    pub fn new(
        title: impl Into<String>,
        channel: impl Into<String>,
        guid: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            channel: channel.into(),
            guid: guid.into(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.channel, self.title)
    }
}
