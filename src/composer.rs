use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::sources::REQUEST_TIMEOUT_SECS;
use crate::types::{DigestError, NewsItem, Result};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// The fixed output grammar the generative service is asked to follow:
/// title line, a RESEARCH section of exactly 5 numbered entries alternating
/// two icons, a TOP STORIES section of exactly 3 numbered entries, and a
/// footer line, all in Telegram MarkdownV2.
const OUTPUT_TEMPLATE: &str = r"*🤖 AI Daily Digest \| {date}*

*🔬 RESEARCH*
1\. 🔬 [title](url) one short takeaway
2\. 🧠 [title](url) one short takeaway
3\. 🔬 [title](url) one short takeaway
4\. 🧠 [title](url) one short takeaway
5\. 🔬 [title](url) one short takeaway

*📰 TOP STORIES*
1\. [title](url) one short takeaway
2\. [title](url) one short takeaway
3\. [title](url) one short takeaway

_That was the brief\. Back tomorrow\._";

/// Trait seam for the digest-composition stage.
#[async_trait]
pub trait ComposeDigest: Send + Sync {
    /// Render the collected items into a single formatted message.
    /// One attempt per run, no retry.
    async fn compose(&self, items: &[NewsItem]) -> Result<String>;
}

/// Composer backed by the Gemini `generateContent` endpoint.
pub struct GeminiComposer {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiComposer {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key, base_url: base_url.into() }
    }
}

#[async_trait]
impl ComposeDigest for GeminiComposer {
    async fn compose(&self, items: &[NewsItem]) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(DigestError::MissingApiKey)?;

        let prompt = build_prompt(items)?;
        debug!("Requesting digest for {} items", items.len());

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, api_key
        );
        let request = GenerateContentRequest {
            contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }],
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::Compose(format!(
                "generative service returned HTTP {}",
                status
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(DigestError::Compose("generative service returned no text".to_string()));
        }

        info!("Composed digest ({} chars)", text.len());
        Ok(text)
    }
}

/// Build the prompt: current date, the serialized item dump and the fixed
/// output template with its escaping rules.
fn build_prompt(items: &[NewsItem]) -> Result<String> {
    let dump = serde_json::to_string_pretty(items)?;
    Ok(format!(
        "You are composing the daily AI news digest for a Telegram channel.\n\
         Current date and time: {}.\n\n\
         Collected items as JSON:\n{}\n\n\
         Write ONE Telegram message following this exact template:\n\n{}\n\n\
         Rules:\n\
         - The RESEARCH section has exactly 5 numbered entries, alternating the 🔬 and 🧠 icons.\n\
         - The TOP STORIES section has exactly 3 numbered entries.\n\
         - Prefer items tagged \"research\" for RESEARCH and items tagged \"news\" for TOP STORIES.\n\
         - Replace {{date}} in the title line with today's date.\n\
         - Format in Telegram MarkdownV2: escape the characters . ! ( ) - _ * [ ] ~ ` > # + = | {{ }} \
         with a backslash everywhere except inside the URL part of [text](url) links.\n\
         - Output only the message text, nothing else.",
        Utc::now().format("%Y-%m-%d %H:%M UTC"),
        dump,
        OUTPUT_TEMPLATE,
    ))
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}
