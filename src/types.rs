use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification tag attached to every collected item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Research,
    News,
}

/// A single item normalized from any source, held in memory for the
/// duration of one digest run. Items have no identity beyond their fields
/// and are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub kind: ItemKind,
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("HTTP {status} from {url}")]
    BadStatus { status: u16, url: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("invalid value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("generative service API key is not configured")]
    MissingApiKey,

    #[error("digest generation failed: {0}")]
    Compose(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
