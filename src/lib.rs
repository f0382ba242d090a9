// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod enrich;
pub mod ingest;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::ingest::config::FeedsConfig;
pub use crate::ingest::types::{FeedProvider, NewsRecord, Source};
pub use crate::report::{Report, SortOrder};

use chrono::{DateTime, Utc};

/// One aggregation pass: fetch every provider in order, then dedup + sort.
///
/// Example:
/// ```ignore
/// let cfg = mna_news_aggregator::FeedsConfig::default();
/// let providers = mna_news_aggregator::ingest::providers::build_http_providers(&cfg)?;
/// let report = mna_news_aggregator::collect_mergers_and_acquisitions(&providers, cfg.sort, chrono::Utc::now()).await;
/// print!("{report}");
/// ```
pub async fn collect_mergers_and_acquisitions(
    providers: &[Box<dyn FeedProvider>],
    sort: SortOrder,
    now: DateTime<Utc>,
) -> Report {
    let outcome = ingest::run_once(providers, now).await;
    report::aggregate(outcome.records, sort)
}
