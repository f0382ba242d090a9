// src/ingest/mod.rs
pub mod config;
pub mod error;
pub mod filter;
pub mod providers;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::ingest::types::{FeedProvider, NewsRecord, Source};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Raw items parsed from feeds.");
        describe_counter!(
            "ingest_kept_total",
            "Records kept after keyword + date filtering."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Feed fetch/parse errors."
        );
        describe_counter!("ingest_dedup_total", "Records removed by title dedup.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub source: Source,
    pub error: String,
}

/// Everything one pass produced: records in provider order, plus who failed.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub records: Vec<NewsRecord>,
    pub failures: Vec<ProviderFailure>,
}

/// Run each provider once, sequentially. A failing provider contributes
/// nothing and does not stop the others.
pub async fn run_once(providers: &[Box<dyn FeedProvider>], now: DateTime<Utc>) -> RunOutcome {
    ensure_metrics_described();

    let mut outcome = RunOutcome::default();
    for p in providers {
        match p.fetch_latest(now).await {
            Ok(mut v) => {
                counter!("ingest_kept_total").increment(v.len() as u64);
                outcome.records.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = %e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                outcome.failures.push(ProviderFailure {
                    source: p.source(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        kept = outcome.records.len(),
        failed = outcome.failures.len(),
        "ingest pass finished"
    );
    outcome
}
