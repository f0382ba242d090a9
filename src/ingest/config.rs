// src/ingest/config.rs
use anyhow::{anyhow, bail, ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::filter::{DateParsing, ItemFilter, DEFAULT_WINDOW_DAYS};
use crate::ingest::types::Source;
use crate::report::SortOrder;

const ENV_PATH: &str = "MNA_FEEDS_PATH";
/// When set, providers read `<dir>/<slug>.xml` instead of hitting the network.
pub const ENV_FIXTURE_DIR: &str = "MNA_FIXTURE_DIR";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_ITEM_CAP: usize = 10;

pub const MARKETWATCH_KEYWORDS: [&str; 8] = [
    "merger",
    "acquisition",
    "acquires",
    "merges",
    "takeover",
    "buyout",
    "fusión",
    "adquisición",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    pub source: Source,
    pub url: String,
    pub limit: Option<usize>,
    pub keywords: Vec<String>,
}

impl FeedSpec {
    pub fn default_for(source: Source) -> Self {
        match source {
            Source::Reuters => Self {
                source,
                url: "https://feeds.reuters.com/reuters/mergersNews".into(),
                limit: Some(DEFAULT_ITEM_CAP),
                keywords: Vec::new(),
            },
            Source::MarketWatch => Self {
                source,
                url: "https://feeds.marketwatch.com/marketwatch/realtimeheadlines/".into(),
                limit: None,
                keywords: MARKETWATCH_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            },
            Source::PrNewswire => Self {
                source,
                url: "https://www.prnewswire.com/rss/news-releases-list.rss?category=mergers-and-acquisitions"
                    .into(),
                limit: Some(DEFAULT_ITEM_CAP),
                keywords: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedsConfig {
    pub window_days: i64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub sort: SortOrder,
    pub date_parsing: DateParsing,
    /// Always one entry per `Source`, in fetch order.
    pub feeds: Vec<FeedSpec>,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sort: SortOrder::default(),
            date_parsing: DateParsing::default(),
            feeds: Source::ALL.into_iter().map(FeedSpec::default_for).collect(),
        }
    }
}

impl FeedsConfig {
    pub fn feed(&self, source: Source) -> Option<&FeedSpec> {
        self.feeds.iter().find(|f| f.source == source)
    }

    pub fn item_filter(&self, spec: &FeedSpec) -> ItemFilter {
        ItemFilter {
            limit: spec.limit,
            keywords: spec.keywords.clone(),
            window_days: self.window_days,
            date_parsing: self.date_parsing,
        }
    }
}

/// Load feeds config from an explicit path. Supports TOML or JSON formats.
pub fn load_feeds_config_from(path: &Path) -> Result<FeedsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds_config(&content, ext.as_str())
        .with_context(|| format!("loading feeds config {}", path.display()))
}

/// Load feeds config using env var + fallbacks:
/// 1) $MNA_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
///
/// Falls back to built-in defaults when none exist.
pub fn load_feeds_config_default() -> Result<FeedsConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feeds_config_from(&json_p);
    }
    Ok(FeedsConfig::default())
}

pub fn fixture_dir_from_env() -> Option<PathBuf> {
    std::env::var(ENV_FIXTURE_DIR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    window_days: Option<i64>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    sort: Option<SortOrder>,
    date_parsing: Option<DateParsing>,
    #[serde(default)]
    feeds: Vec<RawFeed>,
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    source: Source,
    url: Option<String>,
    /// 0 lifts the cap.
    limit: Option<usize>,
    keywords: Option<Vec<String>>,
}

fn parse_feeds_config(s: &str, hint_ext: &str) -> Result<FeedsConfig> {
    let raw: RawConfig = match hint_ext {
        "toml" => toml::from_str(s).context("parsing feeds config as TOML")?,
        "json" => serde_json::from_str(s).context("parsing feeds config as JSON")?,
        _ => {
            // No usable extension: content sniffing, JSON first when it looks like an object.
            if s.trim_start().starts_with('{') {
                serde_json::from_str(s).context("parsing feeds config as JSON")?
            } else if let Ok(v) = toml::from_str(s) {
                v
            } else {
                bail!("unsupported feeds config format")
            }
        }
    };
    resolve(raw)
}

fn resolve(raw: RawConfig) -> Result<FeedsConfig> {
    let mut cfg = FeedsConfig::default();

    if let Some(w) = raw.window_days {
        ensure!(w >= 0, "window_days must be >= 0, got {w}");
        cfg.window_days = w;
    }
    if let Some(t) = raw.timeout_secs {
        ensure!(t > 0, "timeout_secs must be > 0");
        cfg.timeout_secs = t;
    }
    if let Some(ua) = raw.user_agent {
        let ua = ua.trim();
        if !ua.is_empty() {
            cfg.user_agent = ua.to_string();
        }
    }
    if let Some(sort) = raw.sort {
        cfg.sort = sort;
    }
    if let Some(dp) = raw.date_parsing {
        cfg.date_parsing = dp;
    }

    // Later entries for the same source win.
    for f in raw.feeds {
        let Some(spec) = cfg.feeds.iter_mut().find(|s| s.source == f.source) else {
            continue;
        };
        if let Some(url) = f.url {
            let url = url.trim();
            ensure!(!url.is_empty(), "empty url for feed {}", f.source.slug());
            spec.url = url.to_string();
        }
        if let Some(limit) = f.limit {
            spec.limit = (limit > 0).then_some(limit);
        }
        if let Some(kws) = f.keywords {
            spec.keywords = clean_list(kws);
        }
    }

    Ok(cfg)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
