//! Telegram Bot API push channel.
//!
//! Sends plain-text messages with `sendMessage`. A delivery counts as
//! successful only when the API answers 2xx with `"ok": true`.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::AdapterError;

/// Default Bot API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// A bot that can send messages to Telegram chats.
#[derive(Clone)]
pub struct TelegramChannel {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramChannel {
    /// Create a new builder for configuring the channel.
    pub fn builder() -> TelegramChannelBuilder {
        TelegramChannelBuilder::default()
    }

    /// Send `text` to `chat_id`.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), AdapterError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        );

        // The URL embeds the bot token, so errors are reported without it.
        let response = self
            .client
            .post(&url)
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .map_err(|e| AdapterError::DeliveryFailed(e.without_url().to_string()))?;

        let status = response.status();
        let reply: Option<ApiReply> = response.json().await.ok();

        match reply {
            Some(ApiReply { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiReply { description, .. }) => Err(AdapterError::DeliveryFailed(format!(
                "Telegram API returned status {}: {}",
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(AdapterError::DeliveryFailed(format!(
                "Telegram API returned status {} with an unreadable body",
                status.as_u16()
            ))),
        }
    }
}

impl fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Builder for TelegramChannel.
#[derive(Debug, Default)]
pub struct TelegramChannelBuilder {
    api_base: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl TelegramChannelBuilder {
    /// Set the Bot API base URL (default: `https://api.telegram.org`).
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the bot token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the channel.
    pub fn build(self) -> Result<TelegramChannel, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Setup(e.to_string()))?;

        Ok(TelegramChannel {
            client,
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            token: self.token.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}
