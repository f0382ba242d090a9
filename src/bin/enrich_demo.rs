//! Demo that looks up the tickers given on the command line and prints one JSON
//! record per symbol. Failed lookups print `{"error": ...}` instead.

use mna_news_aggregator::enrich::{TickerLookup, YahooFinanceLookup};
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let tickers: Vec<String> = std::env::args().skip(1).collect();
    if tickers.is_empty() {
        eprintln!("usage: enrich_demo <TICKER> [TICKER...]");
        return Ok(());
    }

    let lookup = YahooFinanceLookup::new(Duration::from_secs(10))?;
    for t in &tickers {
        let rec = lookup.lookup(t).await;
        println!("{}", serde_json::to_string(&rec)?);
    }

    Ok(())
}
