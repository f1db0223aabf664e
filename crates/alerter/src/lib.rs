use async_trait::async_trait;
use configuration::TelegramConfig;
use reqwest::Client;
use serde::Serialize;
pub mod error;

pub use error::AlerterError;

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Anything that can deliver a formatted message to the operator.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<(), AlerterError>;
}

/// The JSON payload for the Telegram `sendMessage` endpoint.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str, // To allow for formatting like bold, italics etc.
}

/// A client for sending messages to the Telegram Bot API.
pub struct TelegramAlerter {
    client: Client,
    token: String,
    chat_id: String,
}

impl TelegramAlerter {
    /// Creates a new `TelegramAlerter`.
    ///
    /// Returns `None` if the token or chat_id is missing from the configuration,
    /// allowing the system to gracefully disable alerting.
    pub fn new(config: &TelegramConfig) -> Option<Self> {
        if !config.is_complete() {
            tracing::warn!("Telegram alerter is not configured (missing token or chat_id).");
            return None;
        }
        Some(Self {
            client: Client::new(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }
}

#[async_trait]
impl NotificationSink for TelegramAlerter {
    /// Sends a MarkdownV2 message to the configured Telegram chat.
    ///
    /// The caller is responsible for escaping the message.
    async fn send_message(&self, message: &str) -> Result<(), AlerterError> {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API, self.token);

        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text: message,
            parse_mode: "MarkdownV2",
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(AlerterError::ApiError(error_text));
        }

        Ok(())
    }
}

/// Best-effort delivery: failures are logged and never propagated.
///
/// Returns whether the message was delivered.
pub async fn notify(sink: &dyn NotificationSink, message: &str) -> bool {
    match sink.send_message(message).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Failed to send Telegram notification.");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationSink for Recorder {
        async fn send_message(&self, message: &str) -> Result<(), AlerterError> {
            self.sent.lock().await.push(message.to_string());
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl NotificationSink for Broken {
        async fn send_message(&self, _message: &str) -> Result<(), AlerterError> {
            Err(AlerterError::ApiError("chat not found".to_string()))
        }
    }

    #[test]
    fn missing_credentials_disable_the_alerter() {
        let config = TelegramConfig {
            token: "123:abc".to_string(),
            chat_id: String::new(),
        };
        assert!(TelegramAlerter::new(&config).is_none());
    }

    #[test]
    fn complete_credentials_build_the_alerter() {
        let config = TelegramConfig {
            token: "123:abc".to_string(),
            chat_id: "42".to_string(),
        };
        assert!(TelegramAlerter::new(&config).is_some());
    }

    #[tokio::test]
    async fn notify_delivers_through_the_sink() {
        let sink = Recorder::default();
        assert!(notify(&sink, "hello").await);
        assert_eq!(*sink.sent.lock().await, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn notify_swallows_delivery_failures() {
        assert!(!notify(&Broken, "hello").await);
    }
}
