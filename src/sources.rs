//! Static source registry and classification tables.
//!
//! Everything that decides *what* gets polled and *how it is tagged* lives
//! in these tables so the rules stay auditable and testable in isolation.

use crate::types::ItemKind;

/// A syndication feed to poll on every run.
#[derive(Debug, Clone, Copy)]
pub struct FeedSource {
    pub name: &'static str,
    pub url: &'static str,
}

pub static FEEDS: &[FeedSource] = &[
    FeedSource { name: "arXiv cs.AI", url: "https://rss.arxiv.org/rss/cs.AI" },
    FeedSource { name: "arXiv cs.LG", url: "https://rss.arxiv.org/rss/cs.LG" },
    FeedSource { name: "Google AI Blog", url: "https://blog.google/technology/ai/rss/" },
    FeedSource { name: "MIT Technology Review", url: "https://www.technologyreview.com/feed/" },
    FeedSource { name: "TechCrunch AI", url: "https://techcrunch.com/category/artificial-intelligence/feed/" },
    FeedSource { name: "VentureBeat AI", url: "https://venturebeat.com/category/ai/feed/" },
];

/// Discussion boards polled through their "top of day" feed view.
pub static BOARDS: &[&str] = &["MachineLearning", "LocalLLaMA", "artificial", "singularity"];

/// A feed item is tagged research when its feed URL contains any of these.
pub static RESEARCH_URL_MARKERS: &[&str] = &["arxiv"];

/// Boards whose threads are tagged research rather than news.
pub static RESEARCH_BOARDS: &[&str] = &["MachineLearning", "LocalLLaMA"];

pub const MAX_ITEMS_PER_SOURCE: usize = 5;
pub const SUMMARY_MAX_CHARS: usize = 300;
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

pub const USER_AGENT: &str = "news-digest-bot/0.1 (daily AI news digest)";

/// Discussion threads carry no article body, so their summary is fixed.
pub const BOARD_SUMMARY_PLACEHOLDER: &str = "Community discussion thread";

pub fn classify_feed_url(url: &str) -> ItemKind {
    if RESEARCH_URL_MARKERS.iter().any(|marker| url.contains(marker)) {
        ItemKind::Research
    } else {
        ItemKind::News
    }
}

pub fn classify_board(name: &str) -> ItemKind {
    if RESEARCH_BOARDS.contains(&name) {
        ItemKind::Research
    } else {
        ItemKind::News
    }
}

/// Feed view of a board's highest-ranked posts over the last day.
pub fn board_query_url(name: &str) -> String {
    format!(
        "https://www.reddit.com/r/{}/top/.rss?t=day&limit={}",
        name, MAX_ITEMS_PER_SOURCE
    )
}
