//! Ticker enrichment: look up company attributes for a symbol.
//!
//! Not part of the aggregation pass. Callers who know which tickers a deal
//! involves can use a `TickerLookup` to put headlines in context.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::ingest::filter::NOT_AVAILABLE;

pub const YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";
const QUOTE_MODULES: &str = "assetProfile,price,financialData";
const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyProfile {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: Option<f64>,
    pub price: Option<f64>,
    pub currency: String,
    pub country: String,
}

/// Lookup result. Provider failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnrichmentRecord {
    Found(CompanyProfile),
    Error { error: String },
}

impl EnrichmentRecord {
    pub fn is_error(&self) -> bool {
        matches!(self, EnrichmentRecord::Error { .. })
    }
}

impl fmt::Display for EnrichmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = |v: Option<f64>| v.map_or_else(|| NOT_AVAILABLE.to_string(), |x| x.to_string());
        match self {
            EnrichmentRecord::Error { error } => write!(f, "error: {error}"),
            EnrichmentRecord::Found(p) => write!(
                f,
                "{} ({}) | {} / {} | cap {} | price {} {} | {}",
                p.ticker,
                p.name,
                p.sector,
                p.industry,
                num(p.market_cap),
                num(p.price),
                p.currency,
                p.country
            ),
        }
    }
}

#[async_trait]
pub trait TickerLookup: Send + Sync {
    /// Never fails; errors come back as `EnrichmentRecord::Error`.
    async fn lookup(&self, ticker: &str) -> EnrichmentRecord;
    fn provider_name(&self) -> &'static str;
}

/// Yahoo Finance quoteSummary endpoint.
///
/// Yahoo rejects quote requests without a session cookie and a matching crumb,
/// so the first lookup visits the cookie endpoint, then fetches a crumb from
/// `/v1/test/getcrumb`. The crumb is cached for the lifetime of the lookup; a
/// failed handshake is retried on the next call.
pub struct YahooFinanceLookup {
    http: reqwest::Client,
    base_url: String,
    cookie_url: String,
    crumb: tokio::sync::OnceCell<String>,
}

impl YahooFinanceLookup {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::ingest::config::DEFAULT_USER_AGENT)
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building yahoo http client")?;
        Ok(Self::with_endpoints(http, YAHOO_BASE_URL, YAHOO_COOKIE_URL))
    }

    /// `http` must keep cookies (`cookie_store(true)`) for the crumb to be accepted.
    pub fn with_endpoints(http: reqwest::Client, base_url: &str, cookie_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie_url: cookie_url.to_string(),
            crumb: tokio::sync::OnceCell::new(),
        }
    }

    async fn crumb(&self) -> Result<&str> {
        let crumb = self
            .crumb
            .get_or_try_init(|| async {
                // Answers 404 but still sets the session cookie.
                self.http
                    .get(&self.cookie_url)
                    .send()
                    .await
                    .context("cookie request")?;

                let crumb = self
                    .http
                    .get(format!("{}/v1/test/getcrumb", self.base_url))
                    .send()
                    .await
                    .context("crumb request")?
                    .error_for_status()
                    .context("crumb status")?
                    .text()
                    .await
                    .context("crumb body")?;
                let crumb = crumb.trim().to_string();
                anyhow::ensure!(
                    !crumb.is_empty() && !crumb.contains(['<', '{']),
                    "unexpected crumb response"
                );
                Ok::<_, anyhow::Error>(crumb)
            })
            .await?;
        Ok(crumb.as_str())
    }

    async fn try_lookup(&self, ticker: &str) -> Result<CompanyProfile> {
        let symbol = ticker.trim();
        anyhow::ensure!(!symbol.is_empty(), "empty ticker symbol");

        let crumb = self.crumb().await?;
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let body: Value = self
            .http
            .get(&url)
            .query(&[("modules", QUOTE_MODULES), ("crumb", crumb)])
            .send()
            .await
            .context("quoteSummary request")?
            .error_for_status()
            .context("quoteSummary status")?
            .json()
            .await
            .context("quoteSummary body")?;

        profile_from_quote_summary(symbol, &body)
    }
}

#[async_trait]
impl TickerLookup for YahooFinanceLookup {
    async fn lookup(&self, ticker: &str) -> EnrichmentRecord {
        match self.try_lookup(ticker).await {
            Ok(p) => EnrichmentRecord::Found(p),
            Err(e) => {
                tracing::debug!(
                    error = ?e,
                    ticker,
                    provider = self.provider_name(),
                    "ticker lookup failed"
                );
                EnrichmentRecord::Error {
                    error: format!("{e:#}"),
                }
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "yahoo"
    }
}

/// Map a quoteSummary JSON payload onto a flat profile.
pub fn profile_from_quote_summary(ticker: &str, body: &Value) -> Result<CompanyProfile> {
    let summary = body
        .get("quoteSummary")
        .ok_or_else(|| anyhow!("missing quoteSummary object"))?;

    if let Some(err) = summary.get("error").filter(|e| !e.is_null()) {
        let msg = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("provider returned an error");
        return Err(anyhow!("{msg}"));
    }

    let result = summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .ok_or_else(|| anyhow!("no quote data for {ticker}"))?;

    let profile = result.get("assetProfile");
    let price = result.get("price");
    let financial = result.get("financialData");

    let text = |section: Option<&Value>, key: &str| -> Option<String> {
        section?
            .get(key)?
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    // Yahoo wraps numbers as {"raw": 1.0, "fmt": "1.00"}; accept bare numbers too.
    let number = |section: Option<&Value>, key: &str| -> Option<f64> {
        let v = section?.get(key)?;
        v.get("raw").and_then(Value::as_f64).or_else(|| v.as_f64())
    };

    Ok(CompanyProfile {
        ticker: ticker.to_string(),
        name: text(price, "longName")
            .or_else(|| text(price, "shortName"))
            .unwrap_or_else(|| NOT_AVAILABLE.into()),
        sector: text(profile, "sector").unwrap_or_else(|| NOT_AVAILABLE.into()),
        industry: text(profile, "industry").unwrap_or_else(|| NOT_AVAILABLE.into()),
        market_cap: number(price, "marketCap"),
        price: number(financial, "currentPrice").or_else(|| number(price, "regularMarketPrice")),
        currency: text(price, "currency").unwrap_or_else(|| DEFAULT_CURRENCY.into()),
        country: text(profile, "country").unwrap_or_else(|| NOT_AVAILABLE.into()),
    })
}
