// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ingest::error::FetchError;

/// Feeds we know how to read. Order of `ALL` is the fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Reuters,
    MarketWatch,
    PrNewswire,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Reuters, Source::MarketWatch, Source::PrNewswire];

    /// Human-readable tag printed in the report.
    pub fn tag(self) -> &'static str {
        match self {
            Source::Reuters => "Reuters",
            Source::MarketWatch => "MarketWatch",
            Source::PrNewswire => "PR Newswire",
        }
    }

    /// Config key / fixture file stem.
    pub fn slug(self) -> &'static str {
        match self {
            Source::Reuters => "reuters",
            Source::MarketWatch => "marketwatch",
            Source::PrNewswire => "prnewswire",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsRecord {
    pub source: Source,
    pub title: String,
    pub description: String, // at most 200 chars
    pub url: String,
    pub published_at: String, // raw pubDate as it appeared in the feed
    pub published_ts: i64,    // unix seconds, parsed from published_at
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    /// One pass over the feed. `now` anchors the recency window.
    async fn fetch_latest(&self, now: DateTime<Utc>) -> Result<Vec<NewsRecord>, FetchError>;
    fn source(&self) -> Source;

    fn name(&self) -> &'static str {
        self.source().tag()
    }
}
