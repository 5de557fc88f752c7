//! Polling cursor - the `from_date` sent to the status endpoint.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Whole-second Unix timestamp controlling which updates the endpoint returns.
///
/// Items changed at or after the cursor are included. [`Cursor::UNCONDITIONAL`]
/// (zero) asks for everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Cursor(u64);

impl Cursor {
    /// Fetch regardless of update time.
    pub const UNCONDITIONAL: Cursor = Cursor(0);

    /// Create a cursor from seconds since the Unix epoch.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// The current wall-clock time, truncated to whole seconds.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    /// Seconds since the Unix epoch.
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Whether this cursor asks for an unconditional fetch.
    pub const fn is_unconditional(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
