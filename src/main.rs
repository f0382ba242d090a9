//! M&A news aggregator: binary entrypoint.
//! Fetches the configured feeds once, prints the weekly report and exits.

use anyhow::Result;
use mna_news_aggregator::ingest::config::{fixture_dir_from_env, load_feeds_config_default};
use mna_news_aggregator::ingest::providers::{build_fixture_providers, build_http_providers};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs on stderr so stdout carries only the report.
/// Override the level with RUST_LOG (e.g. `RUST_LOG=mna_news_aggregator=debug`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mna_news_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env when present; MNA_FEEDS_PATH / MNA_FIXTURE_DIR may live there.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = load_feeds_config_default()?;
    let providers = match fixture_dir_from_env() {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "reading feeds from fixtures");
            build_fixture_providers(&cfg, &dir)
        }
        None => build_http_providers(&cfg)?,
    };

    println!("Searching for this week's mergers and acquisitions...");
    let report =
        mna_news_aggregator::collect_mergers_and_acquisitions(&providers, cfg.sort, chrono::Utc::now())
            .await;
    print!("{report}");

    Ok(())
}
