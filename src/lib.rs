//! # reviewwatch
//!
//! Watches homework review statuses on the Practicum API and pushes a
//! Telegram message whenever a homework changes status.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          PollLoop                            │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//! │  │  source  │──▶│ validate │──▶│  detect  │──▶│  notify   │  │
//! │  │ (fetch)  │   │ (shape)  │   │  (diff)  │   │ (Telegram)│  │
//! │  └──────────┘   └──────────┘   └──────────┘   └───────────┘  │
//! │        ▲                                            │        │
//! │        └──────────── sleep(interval) ◀──────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the [`StatusSource`] trait, implemented by
//!   [`PracticumClient`]
//! - **[`detect`]**: compares the previous and current snapshot and yields
//!   [`Transition`]s
//! - **[`notify`]**: the [`PushChannel`] trait and the [`Notifier`], which
//!   suppresses duplicate status and failure messages
//! - **[`poll`]**: the [`PollLoop`] and its [`PollContext`]
//! - **[`config`]**: [`Settings`] loaded from file and environment
//!
//! Any failure inside a cycle is logged, reported once to the same chat and
//! never stops the loop.
//!
//! ## Usage
//!
//! ```bash
//! export PRACTICUM_TOKEN=... TELEGRAM_TOKEN=... TELEGRAM_CHAT_ID=...
//! reviewwatch --interval 600
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use reviewwatch::{connect, Settings};
//! use tokio::sync::watch;
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::load(None).unwrap();
//! let poll = connect(&settings).unwrap();
//!
//! let (_stop, stop_rx) = watch::channel(false);
//! poll.run(stop_rx).await;
//! # });
//! ```

pub mod config;
pub mod detect;
pub mod error;
pub mod logging;
pub mod notify;
pub mod poll;
pub mod source;

use anyhow::{Context, Result};

pub use config::{ConfigError, Credentials, Settings};
pub use detect::{diff, Changes, Transition};
pub use error::MonitorError;
pub use notify::{Delivery, ErrorLatch, NotificationRecord, Notifier, PushChannel};
pub use poll::{CycleOutcome, PollContext, PollLoop};
pub use source::StatusSource;

pub use reviewwatch_adapters::practicum::PracticumClient;
pub use reviewwatch_adapters::telegram::TelegramChannel;
pub use reviewwatch_adapters::AdapterError;
pub use reviewwatch_types::{Cursor, MonitoredItem, ReviewStatus, StatusSnapshot};

/// Build a poll loop talking to the real status endpoint and Telegram.
///
/// Fails with [`ConfigError::MissingCredential`] before any client is created
/// when a required credential is empty.
pub fn connect(settings: &Settings) -> Result<PollLoop<PracticumClient, TelegramChannel>> {
    let credentials = settings.credentials()?;

    let source = PracticumClient::builder()
        .endpoint(&settings.endpoint)
        .token(&credentials.practicum_token)
        .timeout(settings.request_timeout())
        .build()
        .context("failed to create status client")?;

    let channel = TelegramChannel::builder()
        .api_base(&settings.telegram_api)
        .token(&credentials.telegram_token)
        .timeout(settings.request_timeout())
        .build()
        .context("failed to create Telegram client")?;

    Ok(PollLoop::from_settings(settings, &credentials, source, channel))
}
