//! A single monitored homework as reported by the status endpoint.

use crate::{ReviewStatus, UnknownStatus};

/// One homework and its review status at fetch time.
///
/// The status is kept as the raw wire code; use [`MonitoredItem::review_status`]
/// to interpret it. Values are never mutated after a fetch - the next fetch
/// produces new ones.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitoredItem {
    /// Homework identifier, unique within one response.
    #[cfg_attr(feature = "serde", serde(rename = "homework_name"))]
    pub name: String,

    /// Raw status code (`approved`, `reviewing`, `rejected`, or something new).
    pub status: String,

    /// Free-text comment left by the reviewer.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub reviewer_comment: Option<String>,

    /// Name of the lesson the homework belongs to.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub lesson_name: Option<String>,

    /// Server-side time of the last update, as sent (ISO 8601).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub date_updated: Option<String>,
}

impl MonitoredItem {
    /// Create an item with no metadata.
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            reviewer_comment: None,
            lesson_name: None,
            date_updated: None,
        }
    }

    /// Attach a reviewer comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.reviewer_comment = Some(comment.into());
        self
    }

    /// Attach the lesson name.
    pub fn with_lesson(mut self, lesson: impl Into<String>) -> Self {
        self.lesson_name = Some(lesson.into());
        self
    }

    /// Interpret the raw status code.
    pub fn review_status(&self) -> Result<ReviewStatus, UnknownStatus> {
        self.status.parse()
    }
}
