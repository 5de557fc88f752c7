//! # reviewwatch-adapters
//!
//! Adapters for the two remote services reviewwatch talks to.
//!
//! ## Supported Services
//!
//! - **Homework status endpoint** (`practicum` feature) - fetches review
//!   statuses with an OAuth token and a `from_date` cursor
//! - **Telegram Bot API** (`telegram` feature) - delivers text messages to a chat
//!
//! Response validation ([`validate`]) has no feature gate: it works on an
//! already-decoded JSON body.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reviewwatch_adapters::practicum::PracticumClient;
//! use reviewwatch_adapters::validate;
//! use reviewwatch_types::Cursor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PracticumClient::builder()
//!         .token("y0_AgAAAA...")
//!         .build()?;
//!
//!     let raw = client.fetch(Cursor::UNCONDITIONAL).await?;
//!     for item in validate::check(&raw)? {
//!         println!("{}: {}", item.name, item.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod validate;

#[cfg(feature = "practicum")]
pub mod practicum;

#[cfg(feature = "telegram")]
pub mod telegram;

pub use error::AdapterError;

// Re-export types for convenience
pub use reviewwatch_types::{Cursor, MonitoredItem, ReviewStatus, StatusSnapshot};
