use async_trait::async_trait;
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::sources::{
    board_query_url, classify_board, classify_feed_url, FeedSource, BOARDS,
    BOARD_SUMMARY_PLACEHOLDER, FEEDS, MAX_ITEMS_PER_SOURCE, REQUEST_TIMEOUT_SECS,
    SUMMARY_MAX_CHARS, USER_AGENT,
};
use crate::types::{DigestError, ItemKind, NewsItem, Result};

/// Trait seam for the item-collection stage.
///
/// `collect` is infallible overall: per-source failures are caught, logged
/// and skipped inside the implementation, so one unreachable source degrades
/// coverage but never aborts the run.
#[async_trait]
pub trait CollectItems: Send + Sync {
    async fn collect(&self) -> Vec<NewsItem>;
}

/// Polls the configured feeds and discussion boards and normalizes every
/// entry into a [`NewsItem`].
pub struct Collector {
    client: Client,
}

impl Collector {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch every configured source in sequence, skipping the ones that
    /// fail. An empty result is a valid outcome.
    pub async fn collect_all(&self) -> Vec<NewsItem> {
        let mut items = self.collect_feeds(FEEDS).await;
        items.extend(self.collect_boards(BOARDS).await);
        info!("Collected {} items across all sources", items.len());
        items
    }

    pub async fn collect_feeds(&self, feeds: &[FeedSource]) -> Vec<NewsItem> {
        let mut items = Vec::new();
        for feed in feeds {
            match self.fetch_feed(feed).await {
                Ok(mut found) => {
                    debug!("Fetched {} items from {}", found.len(), feed.name);
                    items.append(&mut found);
                }
                Err(e) => warn!("Skipping feed {}: {}", feed.name, e),
            }
        }
        items
    }

    pub async fn collect_boards(&self, boards: &[&str]) -> Vec<NewsItem> {
        let mut items = Vec::new();
        for board in boards {
            match self.fetch_board(board, &board_query_url(board)).await {
                Ok(mut found) => {
                    debug!("Fetched {} threads from r/{}", found.len(), board);
                    items.append(&mut found);
                }
                Err(e) => warn!("Skipping board r/{}: {}", board, e),
            }
        }
        items
    }

    async fn fetch_feed(&self, feed: &FeedSource) -> Result<Vec<NewsItem>> {
        let parsed = self.fetch_and_parse(feed.url).await?;
        Ok(items_from_feed(parsed, feed.name, classify_feed_url(feed.url)))
    }

    pub async fn fetch_board(&self, board: &str, query_url: &str) -> Result<Vec<NewsItem>> {
        let parsed = self.fetch_and_parse(query_url).await?;
        Ok(items_from_board_feed(parsed, board))
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<Feed> {
        ensure_http_url(url)?;
        debug!("Fetching feed: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::BadStatus { status: status.as_u16(), url: url.to_string() });
        }
        let content = response.text().await?;
        parser::parse(content.as_bytes())
            .map_err(|e| DigestError::Parse(format!("{}: {}", url, e)))
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectItems for Collector {
    async fn collect(&self) -> Vec<NewsItem> {
        self.collect_all().await
    }
}

/// Map a parsed syndication feed into at most [`MAX_ITEMS_PER_SOURCE`]
/// normalized items.
pub fn items_from_feed(feed: Feed, source_name: &str, kind: ItemKind) -> Vec<NewsItem> {
    feed.entries
        .into_iter()
        .take(MAX_ITEMS_PER_SOURCE)
        .filter_map(|entry| entry_to_item(entry, source_name, kind))
        .collect()
}

/// Map a board's feed view into normalized items. Discussion threads have
/// no article body, so the summary is a fixed placeholder.
pub fn items_from_board_feed(feed: Feed, board: &str) -> Vec<NewsItem> {
    let kind = classify_board(board);
    let source = format!("r/{}", board);
    feed.entries
        .into_iter()
        .take(MAX_ITEMS_PER_SOURCE)
        .filter_map(|entry| {
            let url = entry.links.first()?.href.clone();
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            Some(NewsItem {
                title,
                summary: BOARD_SUMMARY_PLACEHOLDER.to_string(),
                source: source.clone(),
                url,
                published_at: entry.published.or(entry.updated),
                kind,
            })
        })
        .collect()
}

fn entry_to_item(entry: Entry, source_name: &str, kind: ItemKind) -> Option<NewsItem> {
    let url = entry.links.first()?.href.clone();
    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled".to_string());
    let raw_summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    Some(NewsItem {
        title,
        summary: sanitize_summary(&raw_summary),
        source: source_name.to_string(),
        url,
        published_at: entry.published.or(entry.updated),
        kind,
    })
}

/// Strip markup, cap at [`SUMMARY_MAX_CHARS`] characters and append the
/// ellipsis marker.
pub fn sanitize_summary(raw: &str) -> String {
    let text = strip_html(raw);
    let capped: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{}...", capped)
}

/// Remove HTML tags, decode the common entities and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();
    let mut in_tag = false;

    while let Some(ch) = chars.next() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '&' => {
                let mut entity = String::new();
                while let Some(&next) = chars.peek() {
                    if next == ';' || entity.len() > 8 {
                        break;
                    }
                    entity.push(next);
                    chars.next();
                }
                if chars.peek() == Some(&';') {
                    chars.next();
                    match decode_entity(&entity) {
                        Some(decoded) => text.push(decoded),
                        None => {
                            text.push('&');
                            text.push_str(&entity);
                            text.push(';');
                        }
                    }
                } else {
                    // No terminator, keep the raw text
                    text.push('&');
                    text.push_str(&entity);
                }
            }
            _ => text.push(ch),
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Only http(s) sources are fetched, whatever the tables say.
fn ensure_http_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(DigestError::UnsupportedScheme(scheme.to_string())),
    }
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}
