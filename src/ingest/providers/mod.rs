// src/ingest/providers/mod.rs
pub mod rss_feed;

use std::path::Path;

use crate::ingest::config::FeedsConfig;
use crate::ingest::error::FetchError;
use crate::ingest::types::FeedProvider;
use rss_feed::RssFeedProvider;

/// Live providers, one per configured feed, in fetch order.
pub fn build_http_providers(cfg: &FeedsConfig) -> Result<Vec<Box<dyn FeedProvider>>, FetchError> {
    let mut out: Vec<Box<dyn FeedProvider>> = Vec::with_capacity(cfg.feeds.len());
    for spec in &cfg.feeds {
        out.push(Box::new(RssFeedProvider::from_url(spec, cfg)?));
    }
    Ok(out)
}

/// Offline providers reading `<dir>/<slug>.xml`.
pub fn build_fixture_providers(cfg: &FeedsConfig, dir: &Path) -> Vec<Box<dyn FeedProvider>> {
    cfg.feeds
        .iter()
        .map(|spec| {
            let path = dir.join(format!("{}.xml", spec.source.slug()));
            Box::new(RssFeedProvider::from_fixture_file(spec, cfg, path)) as Box<dyn FeedProvider>
        })
        .collect()
}
