// src/ingest/providers/rss_feed.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::ingest::config::{FeedSpec, FeedsConfig};
use crate::ingest::error::FetchError;
use crate::ingest::filter::{FeedItem, ItemFilter};
use crate::ingest::types::{FeedProvider, NewsRecord, Source};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<FeedItem>,
}

/// Parse an RSS 2.0 document into its raw items.
pub fn parse_feed_items(xml: &str) -> Result<Vec<FeedItem>, FetchError> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).map_err(|e| FetchError::Parse(e.to_string()))?;
    Ok(rss.channel.item)
}

/// One RSS feed (Reuters, MarketWatch or PR Newswire); all three share this code.
pub struct RssFeedProvider {
    source: Source,
    filter: ItemFilter,
    mode: Mode,
}

enum Mode {
    Inline(String),
    File(PathBuf),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedProvider {
    pub fn from_url(spec: &FeedSpec, cfg: &FeedsConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self::with_client(spec, cfg, client))
    }

    /// Reuse an existing client (tests, or callers sharing a connection pool).
    pub fn with_client(spec: &FeedSpec, cfg: &FeedsConfig, client: reqwest::Client) -> Self {
        Self {
            source: spec.source,
            filter: cfg.item_filter(spec),
            mode: Mode::Http {
                url: spec.url.clone(),
                client,
            },
        }
    }

    pub fn from_fixture_str(spec: &FeedSpec, cfg: &FeedsConfig, xml: &str) -> Self {
        Self {
            source: spec.source,
            filter: cfg.item_filter(spec),
            mode: Mode::Inline(xml.to_string()),
        }
    }

    /// File is read on every fetch; a missing file fails like a dead feed.
    pub fn from_fixture_file(spec: &FeedSpec, cfg: &FeedsConfig, path: PathBuf) -> Self {
        Self {
            source: spec.source,
            filter: cfg.item_filter(spec),
            mode: Mode::File(path),
        }
    }

    fn parse_and_select(&self, body: &str, now: DateTime<Utc>) -> Result<Vec<NewsRecord>, FetchError> {
        let t0 = std::time::Instant::now();
        let items = parse_feed_items(body)?;
        counter!("ingest_items_total").increment(items.len() as u64);

        let out = self.filter.select(self.source, items, now);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        tracing::debug!(provider = self.source.tag(), kept = out.len(), "feed parsed");
        Ok(out)
    }
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    tracing::debug!("Fetching RSS feed from: {}", url);
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp.text().await?)
}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_latest(&self, now: DateTime<Utc>) -> Result<Vec<NewsRecord>, FetchError> {
        match &self.mode {
            Mode::Inline(s) => self.parse_and_select(s, now),
            Mode::File(path) => {
                let body = tokio::fs::read_to_string(path).await?;
                self.parse_and_select(&body, now)
            }
            Mode::Http { url, client } => {
                let body = fetch_body(client, url).await?;
                self.parse_and_select(&body, now)
            }
        }
    }

    fn source(&self) -> Source {
        self.source
    }
}

/// Feeds embed HTML entities that are not valid XML. Common ones map to ASCII,
/// other named entities are decoded and unknown ones kept as literal text.
/// The five XML entities and numeric references are left for the XML parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    let out = s
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'");

    static RE_ENTITY: OnceCell<Regex> = OnceCell::new();
    let re = RE_ENTITY.get_or_init(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]{0,31});").unwrap());
    re.replace_all(&out, |caps: &Captures<'_>| {
        let name = &caps[1];
        if matches!(name, "amp" | "lt" | "gt" | "quot" | "apos") {
            return caps[0].to_string();
        }
        let decoded = html_escape::decode_html_entities(&caps[0]);
        if decoded == caps[0] {
            // Unknown entity: escape the ampersand so it survives as text.
            return format!("&amp;{name};");
        }
        decoded
            .chars()
            .map(|c| match c {
                '&' | '<' | '>' | '"' | '\'' => format!("&#{};", c as u32),
                other => other.to_string(),
            })
            .collect()
    })
    .into_owned()
}
