//! Delivery of status and failure notifications with duplicate suppression.
//!
//! The [`Notifier`] itself is stateless; what has already been sent lives in
//! a [`NotificationRecord`] and an [`ErrorLatch`] owned by the poll loop's
//! context and passed in on every call.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use reviewwatch_adapters::telegram::TelegramChannel;
use reviewwatch_adapters::AdapterError;
use reviewwatch_types::ReviewStatus;

use crate::detect::Transition;
use crate::error::MonitorError;

/// A push channel that can deliver a text message to a recipient.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Deliver `text` to `recipient`. Any error means the message was not sent.
    async fn send(&self, recipient: &str, text: &str) -> Result<(), AdapterError>;
}

#[async_trait]
impl PushChannel for TelegramChannel {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), AdapterError> {
        self.send_message(recipient, text).await
    }
}

/// Result of a notification request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The message went out.
    Sent,
    /// An identical message was already sent; nothing was done.
    Skipped,
}

/// Last status actually delivered for each homework.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRecord {
    sent: HashMap<String, ReviewStatus>,
}

impl NotificationRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last status delivered for `name`.
    pub fn last_sent(&self, name: &str) -> Option<ReviewStatus> {
        self.sent.get(name).copied()
    }

    /// Whether `status` is what was last delivered for `name`.
    pub fn already_sent(&self, name: &str, status: ReviewStatus) -> bool {
        self.last_sent(name) == Some(status)
    }

    /// Number of homeworks with at least one delivered notification.
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    /// Check if nothing has been delivered yet.
    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    fn advance(&mut self, name: &str, status: ReviewStatus) {
        self.sent.insert(name.to_string(), status);
    }
}

/// Text of the most recently reported failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLatch {
    last: Option<String>,
}

impl ErrorLatch {
    /// Create an empty latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last reported failure text.
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Whether `text` equals the last reported failure.
    pub fn is_repeat(&self, text: &str) -> bool {
        self.last.as_deref() == Some(text)
    }

    /// Forget the last failure so the next one is reported even if identical.
    pub fn clear(&mut self) {
        self.last = None;
    }

    pub(crate) fn latch(&mut self, text: &str) {
        self.last = Some(text.to_string());
    }
}

/// Sends notifications to a single recipient through a push channel.
#[derive(Debug)]
pub struct Notifier<C> {
    channel: C,
    recipient: String,
}

impl<C: PushChannel> Notifier<C> {
    /// Create a notifier for `recipient`.
    pub fn new(channel: C, recipient: impl Into<String>) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
        }
    }

    /// The underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Send a transition unless the same `(name, status)` was already delivered.
    ///
    /// The record advances only after a successful send, so a failed
    /// transition is tried again the next time it is detected.
    pub async fn notify_transition(
        &self,
        record: &mut NotificationRecord,
        transition: &Transition,
    ) -> Result<Delivery, MonitorError> {
        let name = transition.name();
        if record.already_sent(name, transition.status) {
            debug!(homework = name, status = %transition.status, "transition already notified");
            return Ok(Delivery::Skipped);
        }

        let message = transition.message();
        self.deliver(&message).await?;
        record.advance(name, transition.status);

        info!(
            homework = name,
            status = %transition.status,
            new = transition.is_new(),
            "sent status notification: {}",
            message
        );
        Ok(Delivery::Sent)
    }

    /// Report a failure unless the same text was the last one reported.
    ///
    /// The latch is updated only after a successful send.
    pub async fn notify_error(
        &self,
        latch: &mut ErrorLatch,
        text: &str,
    ) -> Result<Delivery, MonitorError> {
        if latch.is_repeat(text) {
            warn!("failure already reported, suppressing: {}", text);
            return Ok(Delivery::Skipped);
        }

        self.deliver(text).await?;
        latch.latch(text);

        info!("sent failure report: {}", text);
        Ok(Delivery::Sent)
    }

    async fn deliver(&self, text: &str) -> Result<(), MonitorError> {
        self.channel
            .send(&self.recipient, text)
            .await
            .map_err(|err| {
                warn!(error = %err, "push channel rejected message");
                let err = match err {
                    AdapterError::DeliveryFailed(_) => err,
                    other => AdapterError::DeliveryFailed(other.to_string()),
                };
                MonitorError::Adapter(err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use reviewwatch_types::MonitoredItem;

    /// Records every attempt and fails the ones scripted to fail.
    #[derive(Debug, Default)]
    struct FakeChannel {
        attempts: Mutex<Vec<(String, String)>>,
        failures: Mutex<VecDeque<bool>>,
    }

    impl FakeChannel {
        fn failing_first(n: usize) -> Self {
            let channel = Self::default();
            channel.failures.lock().unwrap().extend(std::iter::repeat(true).take(n));
            channel
        }

        fn attempts(&self) -> Vec<(String, String)> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushChannel for FakeChannel {
        async fn send(&self, recipient: &str, text: &str) -> Result<(), AdapterError> {
            self.attempts
                .lock()
                .unwrap()
                .push((recipient.to_string(), text.to_string()));
            if self.failures.lock().unwrap().pop_front().unwrap_or(false) {
                Err(AdapterError::DeliveryFailed("connection reset".into()))
            } else {
                Ok(())
            }
        }
    }

    fn transition(name: &str, status: ReviewStatus) -> Transition {
        Transition {
            item: MonitoredItem::new(name, status.code()),
            status,
            previous: None,
        }
    }

    #[tokio::test]
    async fn test_transition_sent_once() {
        let notifier = Notifier::new(FakeChannel::default(), "42");
        let mut record = NotificationRecord::new();
        let t = transition("hw.zip", ReviewStatus::Reviewing);

        assert_eq!(notifier.notify_transition(&mut record, &t).await, Ok(Delivery::Sent));
        assert_eq!(notifier.notify_transition(&mut record, &t).await, Ok(Delivery::Skipped));

        let attempts = notifier.channel().attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].0, "42");
        assert_eq!(
            attempts[0].1,
            "Изменился статус проверки работы \"hw.zip\". Работа взята на проверку ревьюером."
        );
        assert_eq!(record.last_sent("hw.zip"), Some(ReviewStatus::Reviewing));
    }

    #[tokio::test]
    async fn test_new_status_for_same_item_is_sent() {
        let notifier = Notifier::new(FakeChannel::default(), "42");
        let mut record = NotificationRecord::new();

        let reviewing = transition("hw.zip", ReviewStatus::Reviewing);
        let approved = transition("hw.zip", ReviewStatus::Approved);
        notifier.notify_transition(&mut record, &reviewing).await.unwrap();
        notifier.notify_transition(&mut record, &approved).await.unwrap();

        assert_eq!(notifier.channel().attempts().len(), 2);
        assert_eq!(record.last_sent("hw.zip"), Some(ReviewStatus::Approved));
        assert_eq!(record.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_transition_does_not_advance_record() {
        let notifier = Notifier::new(FakeChannel::failing_first(1), "42");
        let mut record = NotificationRecord::new();
        let t = transition("hw.zip", ReviewStatus::Approved);

        let err = notifier.notify_transition(&mut record, &t).await.unwrap_err();
        assert!(err.is_delivery_failure());
        assert!(record.is_empty());

        // Retried on the next detection.
        assert_eq!(notifier.notify_transition(&mut record, &t).await, Ok(Delivery::Sent));
        assert_eq!(notifier.channel().attempts().len(), 2);
    }

    #[tokio::test]
    async fn test_identical_errors_are_deduplicated() {
        let notifier = Notifier::new(FakeChannel::default(), "42");
        let mut latch = ErrorLatch::new();

        assert_eq!(notifier.notify_error(&mut latch, "boom").await, Ok(Delivery::Sent));
        assert_eq!(notifier.notify_error(&mut latch, "boom").await, Ok(Delivery::Skipped));
        assert_eq!(notifier.channel().attempts().len(), 1);
        assert_eq!(latch.last(), Some("boom"));
    }

    #[tokio::test]
    async fn test_different_errors_are_each_sent() {
        let notifier = Notifier::new(FakeChannel::default(), "42");
        let mut latch = ErrorLatch::new();

        notifier.notify_error(&mut latch, "boom").await.unwrap();
        notifier.notify_error(&mut latch, "bang").await.unwrap();
        notifier.notify_error(&mut latch, "boom").await.unwrap();
        assert_eq!(notifier.channel().attempts().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_error_report_leaves_latch() {
        let notifier = Notifier::new(FakeChannel::failing_first(1), "42");
        let mut latch = ErrorLatch::new();

        assert!(notifier.notify_error(&mut latch, "boom").await.is_err());
        assert_eq!(latch.last(), None);

        assert_eq!(notifier.notify_error(&mut latch, "boom").await, Ok(Delivery::Sent));
        assert_eq!(latch.last(), Some("boom"));
    }

    #[test]
    fn test_latch_clear() {
        let mut latch = ErrorLatch::new();
        latch.latch("boom");
        assert!(latch.is_repeat("boom"));
        latch.clear();
        assert!(!latch.is_repeat("boom"));
    }
}
