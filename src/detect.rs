//! Transition detection between two consecutive snapshots.
//!
//! An item has transitioned when its name was absent from the previous
//! snapshot or its status differs from the one recorded there. Items that
//! disappear from the response are not transitions.

use std::collections::HashMap;

use reviewwatch_types::{MonitoredItem, ReviewStatus, StatusSnapshot};

use crate::error::MonitorError;

/// A detected status change for one homework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The item as fetched in the current cycle.
    pub item: MonitoredItem,
    /// Parsed new status.
    pub status: ReviewStatus,
    /// Raw status code from the previous snapshot, if the item was there.
    pub previous: Option<String>,
}

impl Transition {
    /// Whether the item did not appear in the previous snapshot.
    pub fn is_new(&self) -> bool {
        self.previous.is_none()
    }

    /// Homework name.
    pub fn name(&self) -> &str {
        &self.item.name
    }

    /// Render the operator-facing notification text.
    pub fn message(&self) -> String {
        format!(
            "Изменился статус проверки работы \"{}\". {}",
            self.item.name,
            self.status.verdict()
        )
    }
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Changed items with a known status, in `current` order.
    pub transitions: Vec<Transition>,
    /// Changed items whose status is outside the known set, in `current` order.
    pub rejected: Vec<MonitorError>,
}

impl Changes {
    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() && self.rejected.is_empty()
    }

    /// Names of the rejected items.
    pub fn rejected_names(&self) -> impl Iterator<Item = &str> {
        self.rejected.iter().filter_map(|err| match err {
            MonitorError::UnknownStatus { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Compare `current` against `previous` and list what changed.
///
/// Changes are returned in the order they appear in `current`. A changed
/// item whose status is not a known [`ReviewStatus`] goes to
/// [`Changes::rejected`] as [`MonitorError::UnknownStatus`]; the other items
/// are unaffected. Unchanged items are not parsed.
///
/// The comparison has no side effects: the same inputs always give the same
/// output.
pub fn diff(previous: Option<&StatusSnapshot>, current: &StatusSnapshot) -> Changes {
    let known: HashMap<&str, &str> = previous
        .map(|snapshot| {
            snapshot
                .iter()
                .map(|item| (item.name.as_str(), item.status.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let mut changes = Changes::default();
    for item in current.iter() {
        let before = known.get(item.name.as_str()).copied();
        if before == Some(item.status.as_str()) {
            continue;
        }

        match item.review_status() {
            Ok(status) => changes.transitions.push(Transition {
                item: item.clone(),
                status,
                previous: before.map(str::to_string),
            }),
            Err(unknown) => changes.rejected.push(MonitorError::UnknownStatus {
                name: item.name.clone(),
                code: unknown.0,
            }),
        }
    }

    changes
}
