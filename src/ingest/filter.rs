// src/ingest/filter.rs
//! Per-item rules shared by every feed: item cap, title keywords, pubDate window.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::types::{NewsRecord, Source};

/// Placeholder for fields missing from a feed item.
pub const NOT_AVAILABLE: &str = "N/A";
/// The one pubDate layout accepted in strict mode, after the `"<weekday>, "` prefix.
/// The weekday name must be valid but is not checked against the date.
pub const PUB_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S %z";
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub const DESCRIPTION_MAX_CHARS: usize = 200;
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// One `<item>` as it came off the wire; every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateParsing {
    /// Only `"<weekday>, "` + `PUB_DATE_FORMAT`; "GMT" zones and ISO-8601 dates are dropped.
    #[default]
    Strict,
    /// Anything RFC 2822 allows (named zones, optional weekday).
    Rfc2822,
}

pub fn parse_pub_date(raw: &str, mode: DateParsing) -> Option<DateTime<FixedOffset>> {
    match mode {
        DateParsing::Strict => {
            let (weekday, rest) = raw.split_once(',')?;
            if !WEEKDAYS.iter().any(|w| w.eq_ignore_ascii_case(weekday)) {
                return None;
            }
            DateTime::parse_from_str(rest.trim_start(), PUB_DATE_FORMAT).ok()
        }
        DateParsing::Rfc2822 => {
            let dt = OffsetDateTime::parse(raw.trim(), &Rfc2822).ok()?;
            let offset = FixedOffset::east_opt(dt.offset().whole_seconds())?;
            DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond())
                .map(|utc| utc.with_timezone(&offset))
        }
    }
}

/// Whole days elapsed (truncated) must not exceed the window. No lower bound,
/// so future-dated items pass.
pub fn within_window(published: &DateTime<FixedOffset>, now: DateTime<Utc>, window_days: i64) -> bool {
    (now - published.with_timezone(&Utc)).num_days() <= window_days
}

/// Case-insensitive substring match. An empty keyword list matches everything.
pub fn matches_keywords(title: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let title = title.to_lowercase();
    keywords
        .iter()
        .any(|kw| title.contains(kw.to_lowercase().as_str()))
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFilter {
    /// Cap applied to the raw item list before any other rule.
    pub limit: Option<usize>,
    pub keywords: Vec<String>,
    pub window_days: i64,
    pub date_parsing: DateParsing,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self {
            limit: None,
            keywords: Vec::new(),
            window_days: DEFAULT_WINDOW_DAYS,
            date_parsing: DateParsing::Strict,
        }
    }
}

impl ItemFilter {
    /// Turn raw feed items into records, dropping anything outside the rules.
    pub fn select(&self, source: Source, items: Vec<FeedItem>, now: DateTime<Utc>) -> Vec<NewsRecord> {
        let cap = self.limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();

        for it in items.into_iter().take(cap) {
            // Keyword mode needs a real title; without keywords a missing one becomes "N/A".
            let title = if self.keywords.is_empty() {
                it.title.unwrap_or_else(|| NOT_AVAILABLE.to_string())
            } else {
                match it.title {
                    Some(t) if matches_keywords(&t, &self.keywords) => t,
                    _ => continue,
                }
            };

            let raw_date = it.pub_date.unwrap_or_default();
            let Some(published) = parse_pub_date(&raw_date, self.date_parsing) else {
                tracing::trace!(source = source.tag(), pub_date = %raw_date, "unparsable pubDate, skipping");
                continue;
            };
            if !within_window(&published, now, self.window_days) {
                continue;
            }

            out.push(NewsRecord {
                source,
                title,
                description: it
                    .description
                    .map(|d| truncate_chars(&d, DESCRIPTION_MAX_CHARS))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                url: it.link.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                published_at: raw_date,
                published_ts: published.timestamp(),
            });
        }

        out
    }
}
