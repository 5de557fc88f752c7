//! The poll loop: fetch, validate, diff, notify, sleep.
//!
//! All long-lived state sits in a [`PollContext`] owned by the loop. Cycles
//! run strictly one after another on a single task, so the context is never
//! shared and needs no locking.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use reviewwatch_adapters::validate;
use reviewwatch_types::{Cursor, StatusSnapshot};

use crate::config::{Credentials, Settings};
use crate::detect::{self, Changes};
use crate::error::MonitorError;
use crate::notify::{Delivery, ErrorLatch, NotificationRecord, Notifier, PushChannel};
use crate::source::StatusSource;

/// Process-lifetime state carried from one cycle to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollContext {
    /// Last adopted snapshot, held-back items excluded; `None` until a fetch
    /// first succeeds.
    pub last_known: Option<StatusSnapshot>,
    /// What has been delivered per homework.
    pub notified: NotificationRecord,
    /// Last failure text delivered to the operator.
    pub last_error: ErrorLatch,
    /// Cursor for the next fetch.
    pub cursor: Cursor,
}

impl PollContext {
    /// Fresh state starting at `cursor`.
    pub fn new(cursor: Cursor) -> Self {
        Self {
            cursor,
            ..Self::default()
        }
    }

    /// Adopt `snapshot` as the new known state and move the cursor forward.
    fn accept(&mut self, snapshot: StatusSnapshot) {
        if let Some(server_time) = snapshot.server_time {
            self.cursor = server_time;
        }
        self.last_known = Some(snapshot);
        self.last_error.clear();
    }

    /// Adopt `snapshot` except for the `held_back` items, which keep their
    /// previous entry (or stay absent) so they are detected again. The cursor
    /// stays put so the endpoint keeps returning them.
    fn accept_partial(&mut self, mut snapshot: StatusSnapshot, held_back: &HashSet<&str>) {
        let previous = self.last_known.take();
        snapshot.items = snapshot
            .items
            .into_iter()
            .filter_map(|item| {
                if !held_back.contains(item.name.as_str()) {
                    return Some(item);
                }
                previous
                    .as_ref()
                    .and_then(|known| known.get(&item.name))
                    .cloned()
            })
            .collect();
        self.last_known = Some(snapshot);
    }
}

/// What a single cycle ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Everything succeeded; known state and cursor advanced.
    Accepted { sent: usize },
    /// Some changes could not be delivered or carried an unknown status.
    /// Those items keep their previous state and are detected again next
    /// cycle; the cursor does not move.
    Incomplete {
        sent: usize,
        undelivered: usize,
        rejected: usize,
    },
    /// Fetch or validation failed.
    Failed(MonitorError),
}

/// Drives cycles against a status source and a push channel.
#[derive(Debug)]
pub struct PollLoop<S, C> {
    source: S,
    notifier: Notifier<C>,
    interval: Duration,
    context: PollContext,
}

impl<S: StatusSource, C: PushChannel> PollLoop<S, C> {
    /// Create a loop with fresh state.
    pub fn new(source: S, notifier: Notifier<C>, interval: Duration, cursor: Cursor) -> Self {
        Self {
            source,
            notifier,
            interval,
            context: PollContext::new(cursor),
        }
    }

    /// Create a loop from settings and already checked credentials.
    pub fn from_settings(
        settings: &Settings,
        credentials: &Credentials,
        source: S,
        channel: C,
    ) -> Self {
        Self::new(
            source,
            Notifier::new(channel, &credentials.telegram_chat_id),
            settings.retry_interval(),
            settings.initial_cursor(),
        )
    }

    /// Current state.
    pub fn context(&self) -> &PollContext {
        &self.context
    }

    /// The configured status source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The notifier in use.
    pub fn notifier(&self) -> &Notifier<C> {
        &self.notifier
    }

    /// Sleep between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until `stop` turns `true` or its sender is dropped.
    ///
    /// A stop request is honoured between cycles only: a cycle that has
    /// started always runs to completion. Returns the final context.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> PollContext {
        info!(
            source = self.source.description(),
            interval = ?self.interval,
            cursor = %self.context.cursor,
            "starting poll loop"
        );

        loop {
            if *stop.borrow() {
                break;
            }

            let outcome = self.run_cycle().await;
            debug!(?outcome, "cycle finished");

            if sleep_or_stop(self.interval, &mut stop).await {
                break;
            }
        }

        info!("poll loop stopped");
        self.context
    }

    /// Run one cycle without sleeping.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                let changes = detect::diff(self.context.last_known.as_ref(), &snapshot);
                self.deliver(snapshot, changes).await
            }
            Err(err) => {
                self.report_failure(&err).await;
                CycleOutcome::Failed(err)
            }
        }
    }

    async fn fetch_snapshot(&self) -> Result<StatusSnapshot, MonitorError> {
        let cursor = self.context.cursor;
        debug!(source = self.source.description(), %cursor, "requesting statuses");

        let raw = self.source.fetch(cursor).await?;
        let items = validate::check(&raw)?;
        Ok(StatusSnapshot::new(cursor, items).with_server_time(validate::server_time(&raw)))
    }

    async fn deliver(&mut self, snapshot: StatusSnapshot, changes: Changes) -> CycleOutcome {
        let mut sent = 0;
        let mut undelivered = 0;
        let mut held_back: HashSet<&str> = changes.rejected_names().collect();

        for transition in &changes.transitions {
            match self
                .notifier
                .notify_transition(&mut self.context.notified, transition)
                .await
            {
                Ok(Delivery::Sent) => sent += 1,
                Ok(Delivery::Skipped) => {}
                Err(err) => {
                    undelivered += 1;
                    held_back.insert(transition.name());
                    error!(
                        homework = transition.name(),
                        error = %err,
                        "status notification not delivered, will retry"
                    );
                }
            }
        }

        let rejected = changes.rejected.len();

        if let Some(first) = changes.rejected.first() {
            for err in &changes.rejected {
                error!(error = %err, "change not notified");
            }
            self.report_failure(first).await;
        }

        if held_back.is_empty() {
            if changes.is_empty() {
                debug!(items = snapshot.len(), "statuses unchanged");
            }
            self.context.accept(snapshot);
            return CycleOutcome::Accepted { sent };
        }

        warn!(sent, undelivered, rejected, "holding back changes until they can be notified");
        self.context.accept_partial(snapshot, &held_back);
        CycleOutcome::Incomplete {
            sent,
            undelivered,
            rejected,
        }
    }

    async fn report_failure(&mut self, err: &MonitorError) {
        if !err.is_unknown_status() {
            error!(error = %err, "cycle failed");
        }

        let text = err.report();
        match self
            .notifier
            .notify_error(&mut self.context.last_error, &text)
            .await
        {
            Ok(Delivery::Sent) => {}
            Ok(Delivery::Skipped) => debug!("same failure as last cycle, not reported again"),
            Err(delivery) => error!(error = %delivery, "failure report not delivered"),
        }
    }
}

/// Sleep for `interval`; returns `true` if a stop was requested meanwhile.
async fn sleep_or_stop(interval: Duration, stop: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    return true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_advances_cursor_and_clears_error() {
        let mut context = PollContext::new(Cursor::from_secs(100));
        context.last_error.latch("endpoint down");

        let snapshot = StatusSnapshot::builder()
            .cursor(Cursor::from_secs(100))
            .server_time(Cursor::from_secs(160))
            .item("a", "approved")
            .build();
        context.accept(snapshot.clone());

        assert_eq!(context.cursor, Cursor::from_secs(160));
        assert_eq!(context.last_known, Some(snapshot));
        assert_eq!(context.last_error.last(), None);
    }

    #[test]
    fn test_accept_without_server_time_keeps_cursor() {
        let mut context = PollContext::new(Cursor::from_secs(100));
        context.accept(StatusSnapshot::new(Cursor::from_secs(100), Vec::new()));
        assert_eq!(context.cursor, Cursor::from_secs(100));
        assert!(context.last_known.is_some());
    }

    #[test]
    fn test_accept_partial_keeps_previous_entry_for_held_back_items() {
        let mut context = PollContext::new(Cursor::from_secs(100));
        context.accept(
            StatusSnapshot::builder()
                .cursor(Cursor::from_secs(100))
                .server_time(Cursor::from_secs(150))
                .item("a", "reviewing")
                .build(),
        );

        let current = StatusSnapshot::builder()
            .cursor(Cursor::from_secs(150))
            .server_time(Cursor::from_secs(200))
            .item("a", "rejected")
            .item("b", "approved")
            .item("c", "reviewing")
            .build();
        let held_back: HashSet<&str> = ["a", "b"].into_iter().collect();
        context.accept_partial(current, &held_back);

        let known = context.last_known.as_ref().unwrap();
        assert_eq!(known.get("a").unwrap().status, "reviewing");
        assert!(known.get("b").is_none());
        assert_eq!(known.get("c").unwrap().status, "reviewing");
        assert_eq!(context.cursor, Cursor::from_secs(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_or_stop_elapses() {
        let (_tx, mut rx) = watch::channel(false);
        assert!(!sleep_or_stop(Duration::from_secs(600), &mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_or_stop_interrupted() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move { sleep_or_stop(Duration::from_secs(600), &mut rx).await });
        tx.send(true).unwrap();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_or_stop_ignores_false_updates() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(false).unwrap();
        assert!(!sleep_or_stop(Duration::from_secs(1), &mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_or_stop_sender_dropped() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert!(sleep_or_stop(Duration::from_secs(600), &mut rx).await);
    }
}
