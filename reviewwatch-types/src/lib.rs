//! # reviewwatch-types
//!
//! Core types for watching the review status of submitted homeworks. This
//! crate defines the values that flow between the status client, the
//! transition detector and the notifier.
//!
//! ## Design Goals
//!
//! - **Closed status set**: [`ReviewStatus`] is the only source of verdict text
//! - **Raw wire codes kept**: [`MonitoredItem`] stores the status exactly as
//!   received so unknown codes can be rejected downstream
//! - **Optional serialization**: Enable the `serde` feature as needed
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde (matches the status endpoint's
//!   field names)
//!
//! ## Example
//!
//! ```rust
//! use reviewwatch_types::{Cursor, ReviewStatus, StatusSnapshot};
//!
//! let snapshot = StatusSnapshot::builder()
//!     .cursor(Cursor::from_secs(1_700_000_000))
//!     .item("alice__hw05.zip", "reviewing")
//!     .item("alice__hw06.zip", "approved")
//!     .build();
//!
//! assert_eq!(snapshot.len(), 2);
//! let status: ReviewStatus = snapshot.items[1].status.parse().unwrap();
//! assert_eq!(status, ReviewStatus::Approved);
//! ```

mod cursor;
mod item;
mod snapshot;
mod status;

pub use cursor::*;
pub use item::*;
pub use snapshot::*;
pub use status::*;
