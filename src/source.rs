//! Status source abstraction for the poll loop.
//!
//! The loop only needs "give me the raw response for this cursor". Keeping
//! that behind a trait lets tests script responses without a network.

use async_trait::async_trait;
use serde_json::Value;

use reviewwatch_adapters::practicum::PracticumClient;
use reviewwatch_adapters::AdapterError;
use reviewwatch_types::Cursor;

/// Trait for fetching homework statuses.
///
/// Implementations make exactly one request per call and never retry.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the undecoded response body for items changed at or after `cursor`.
    async fn fetch(&self, cursor: Cursor) -> Result<Value, AdapterError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used in log lines.
    fn description(&self) -> &str;
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, cursor: Cursor) -> Result<Value, AdapterError> {
        PracticumClient::fetch(self, cursor).await
    }

    fn description(&self) -> &str {
        self.endpoint()
    }
}
