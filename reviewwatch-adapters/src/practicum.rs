//! Homework status endpoint adapter.
//!
//! Issues one authenticated `GET` per call with the polling cursor as the
//! `from_date` query parameter. There is no retry here; the caller decides
//! when to try again.
//!
//! ## Example
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
//!     let raw = client.fetch(Cursor::now()).await?;
//!     for item in validate::check(&raw)? {
//!         println!("{}: {}", item.name, item.status);
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use reviewwatch_types::Cursor;

use crate::AdapterError;

/// Default status endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Client for the homework status endpoint.
#[derive(Clone)]
pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> PracticumClientBuilder {
        PracticumClientBuilder::default()
    }

    /// The endpoint this client queries.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the raw response body for items changed at or after `cursor`.
    ///
    /// Only a `200 OK` with a JSON body succeeds. The body is returned
    /// undecoded so it can go through [`crate::validate::check`].
    pub async fn fetch(&self, cursor: Cursor) -> Result<Value, AdapterError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", cursor.as_secs())])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AdapterError::UnexpectedStatusCode(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidBody(e.without_url().to_string()))
    }
}

impl fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Builder for PracticumClient.
#[derive(Debug, Default)]
pub struct PracticumClientBuilder {
    endpoint: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl PracticumClientBuilder {
    /// Set the status endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the OAuth token sent in the `Authorization` header.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PracticumClient, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Setup(e.to_string()))?;

        Ok(PracticumClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            token: self.token.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PracticumClient {
        PracticumClient::builder()
            .endpoint(format!("{}/api/user_api/homework_statuses/", server.uri()))
            .token("secret-token")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let client = PracticumClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(client.token, "");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = PracticumClient::builder().token("hunter2").build().unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_fetch_sends_cursor_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user_api/homework_statuses/"))
            .and(query_param("from_date", "1581604970"))
            .and(header("authorization", "OAuth secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "homeworks": [{"homework_name": "hw.zip", "status": "approved"}],
                "current_date": 1581604980
            })))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client_for(&server)
            .fetch(Cursor::from_secs(1581604970))
            .await
            .unwrap();
        assert_eq!(raw["homeworks"][0]["homework_name"], "hw.zip");
    }

    #[tokio::test]
    async fn test_fetch_unconditional_cursor_is_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("from_date", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"homeworks": []})))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client_for(&server)
            .fetch(Cursor::UNCONDITIONAL)
            .await
            .unwrap();
        assert_eq!(raw, json!({"homeworks": []}));
    }

    #[tokio::test]
    async fn test_fetch_non_ok_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(Cursor::UNCONDITIONAL)
            .await
            .unwrap_err();
        assert_eq!(err, AdapterError::UnexpectedStatusCode(503));
    }

    #[tokio::test]
    async fn test_fetch_other_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(Cursor::UNCONDITIONAL)
            .await
            .unwrap_err();
        assert_eq!(err, AdapterError::UnexpectedStatusCode(204));
    }

    #[tokio::test]
    async fn test_fetch_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(Cursor::UNCONDITIONAL)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        // Nothing listens on port 1.
        let client = PracticumClient::builder()
            .endpoint("http://127.0.0.1:1/api/user_api/homework_statuses/")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let err = client.fetch(Cursor::UNCONDITIONAL).await.unwrap_err();
        assert!(matches!(err, AdapterError::EndpointUnreachable(_)));
    }
}
