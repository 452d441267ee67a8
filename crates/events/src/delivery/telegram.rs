//! Telegram Bot API delivery.
//!
//! [`TelegramDelivery`] posts a plain-text message to one chat via
//! `sendMessage`. A single attempt is made with a short timeout; callers
//! treat the result as advisory. Configuration is loaded from the
//! environment; [`TelegramConfig::from_env`] returns `None` unless
//! notifications are explicitly enabled and fully configured.

use std::time::Duration;

use serde::Serialize;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The Bot API returned a non-2xx status code.
    #[error("Telegram returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// TelegramConfig
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Bot API base URL, overridable for tests.
    pub api_base: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TelegramConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                                 | Required | Default |
    /// |------------------------------------------|----------|---------|
    /// | `TG_ENABLED`                             | yes      | `false` |
    /// | `TG_BOT_TOKEN` or `TELEGRAM_BOT_TOKEN`   | yes      | —       |
    /// | `TG_CHAT_ID` or `TELEGRAM_CHAT_ID`       | yes      | —       |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let enabled = lookup("TG_ENABLED").is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        if !enabled {
            return None;
        }

        let non_empty = |primary: &str, fallback: &str| {
            lookup(primary)
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(fallback).filter(|v| !v.is_empty()))
        };

        Some(Self {
            bot_token: non_empty("TG_BOT_TOKEN", "TELEGRAM_BOT_TOKEN")?,
            chat_id: non_empty("TG_CHAT_ID", "TELEGRAM_CHAT_ID")?,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// TelegramDelivery
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Sends operator notifications to a Telegram chat.
pub struct TelegramDelivery {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramDelivery {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Deliver `text` once.
    pub async fn send(&self, text: &str) -> Result<(), TelegramError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        );
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text,
            disable_web_page_preview: true,
        };

        let response = self.client.post(url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(TelegramError::HttpStatus(response.status().as_u16()));
        }
        tracing::debug!(chat_id = %self.config.chat_id, "Telegram notification sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn config(api_base: String) -> TelegramConfig {
        TelegramConfig {
            bot_token: "123:abc".into(),
            chat_id: "42".into(),
            api_base,
        }
    }

    #[test]
    fn disabled_by_default() {
        let vars = lookup(&[("TG_BOT_TOKEN", "t"), ("TG_CHAT_ID", "c")]);
        assert!(TelegramConfig::from_lookup(vars).is_none());
    }

    #[test]
    fn enabled_requires_token_and_chat() {
        let vars = lookup(&[("TG_ENABLED", "true"), ("TG_BOT_TOKEN", "t")]);
        assert!(TelegramConfig::from_lookup(vars).is_none());
    }

    #[test]
    fn long_names_are_fallbacks() {
        let vars = lookup(&[
            ("TG_ENABLED", "TRUE"),
            ("TG_BOT_TOKEN", ""),
            ("TELEGRAM_BOT_TOKEN", "long-token"),
            ("TG_CHAT_ID", "short-chat"),
            ("TELEGRAM_CHAT_ID", "long-chat"),
        ]);
        let config = TelegramConfig::from_lookup(vars).unwrap();
        assert_eq!(config.bot_token, "long-token");
        assert_eq!(config.chat_id, "short-chat");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn debug_redacts_token() {
        let debug = format!("{:?}", config("http://x".into()));
        assert!(!debug.contains("123:abc"));
    }

    #[test]
    fn error_display_http_status() {
        assert_eq!(TelegramError::HttpStatus(429).to_string(), "Telegram returned HTTP 429");
    }

    #[tokio::test]
    async fn send_posts_message_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(serde_json::json!({
                "chat_id": "42",
                "text": "New job detected",
                "disable_web_page_preview": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let delivery = TelegramDelivery::new(config(server.uri())).unwrap();
        delivery.send("New job detected").await.unwrap();
    }

    #[tokio::test]
    async fn send_reports_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let delivery = TelegramDelivery::new(config(server.uri())).unwrap();
        let err = delivery.send("hi").await.unwrap_err();
        assert!(matches!(err, TelegramError::HttpStatus(401)));
    }
}
