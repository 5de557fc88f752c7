//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when talking to the status endpoint or the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The service could not be reached (DNS, connect or timeout failure).
    #[error("endpoint unreachable: {0}")]
    EndpointUnreachable(String),

    /// The service replied with a status other than 200 OK.
    #[error("endpoint returned unexpected status code {0}")]
    UnexpectedStatusCode(u16),

    /// A 200 response whose body is not JSON.
    #[error("failed to decode response body: {0}")]
    InvalidBody(String),

    /// A required key is absent from the response body.
    #[error("response is missing the `{0}` key")]
    MissingField(String),

    /// A key is present but its value has the wrong shape.
    #[error("response field `{field}` is malformed: {reason}")]
    MalformedField { field: String, reason: String },

    /// The push channel rejected or could not accept a message.
    #[error("message delivery failed: {0}")]
    DeliveryFailed(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Setup(String),
}

#[cfg(any(feature = "practicum", feature = "telegram"))]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            AdapterError::InvalidBody(err.to_string())
        } else {
            AdapterError::EndpointUnreachable(err.to_string())
        }
    }
}
