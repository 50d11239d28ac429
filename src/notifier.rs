use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::sources::REQUEST_TIMEOUT_SECS;
use crate::types::{DigestError, Result};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Punctuation Telegram's MarkdownV2 dialect requires to be escaped.
pub const MARKDOWN_V2_RESERVED: &[char] = &[
    '.', '!', '(', ')', '-', '_', '*', '[', ']', '~', '`', '>', '#', '+', '=', '|', '{', '}',
];

/// Trait seam for the delivery stage.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Deliver the text as-is. One attempt, bounded timeout.
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Delivers digests through the Telegram `sendMessage` endpoint.
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Self {
        Self::with_base_url(token, chat_id, TELEGRAM_API_BASE)
    }

    pub fn with_base_url(token: String, chat_id: String, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, token, chat_id, base_url: base_url.into() }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[async_trait]
impl Notify for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "MarkdownV2",
            disable_web_page_preview: true,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DigestError::Delivery(format!("telegram returned HTTP {}: {}", status, body)));
        }

        info!("Message delivered to chat {}", self.chat_id);
        Ok(())
    }
}

/// Escape bot-authored plain text for MarkdownV2. Composed digests arrive
/// already escaped and are sent as-is.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if MARKDOWN_V2_RESERVED.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
