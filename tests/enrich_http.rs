// tests/enrich_http.rs
mod common;

use common::Route;
use mna_news_aggregator::enrich::{EnrichmentRecord, TickerLookup, YahooFinanceLookup};

const QUOTE_JSON: &str = r#"{
  "quoteSummary": {
    "result": [{
      "assetProfile": {"sector": "Industrials", "industry": "Specialty Industrial Machinery", "country": "United States"},
      "price": {"longName": "Acme Corporation", "currency": "USD", "marketCap": {"raw": 41000000000, "fmt": "41B"}, "regularMarketPrice": {"raw": 88.25}}
    }],
    "error": null
  }
}"#;

fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

fn yahoo_routes(crumb: &str, quote_status: &'static str, quote_body: &str) -> Vec<Route> {
    vec![
        Route {
            path: "/cookie",
            status: "404 Not Found",
            headers: "set-cookie: A3=d=session42; Path=/\r\n",
            body: String::new(),
        },
        Route {
            path: "/v1/test/getcrumb",
            status: "200 OK",
            headers: "content-type: text/plain\r\n",
            body: crumb.to_string(),
        },
        Route {
            path: "/v10/finance/quoteSummary/ACME",
            status: quote_status,
            headers: "content-type: application/json\r\n",
            body: quote_body.to_string(),
        },
    ]
}

#[tokio::test]
async fn lookup_maps_provider_payload() {
    let (base, seen) = common::serve_routes(yahoo_routes("crumb123", "200 OK", QUOTE_JSON)).await;
    let lookup = YahooFinanceLookup::with_endpoints(cookie_client(), &base, &format!("{base}/cookie"));

    let rec = lookup.lookup("ACME").await;
    match rec {
        EnrichmentRecord::Found(p) => {
            assert_eq!(p.ticker, "ACME");
            assert_eq!(p.name, "Acme Corporation");
            assert_eq!(p.sector, "Industrials");
            assert_eq!(p.market_cap, Some(41_000_000_000.0));
            // no financialData -> falls back to regularMarketPrice
            assert_eq!(p.price, Some(88.25));
        }
        other => panic!("expected profile, got {other:?}"),
    }

    let heads = seen.lock().unwrap().clone();
    assert_eq!(heads.len(), 3);
    assert!(heads[0].starts_with("GET /cookie "));
    assert!(heads[1].starts_with("GET /v1/test/getcrumb "));
    assert!(heads[1].to_lowercase().contains("cookie: a3=d=session42"));

    let quote = &heads[2];
    assert!(quote.starts_with("GET /v10/finance/quoteSummary/ACME?modules="));
    assert!(quote.lines().next().unwrap().contains("crumb=crumb123"));
    assert!(quote.to_lowercase().contains("cookie: a3=d=session42"));
}

#[tokio::test]
async fn crumb_is_fetched_once_per_lookup_instance() {
    let (base, seen) = common::serve_routes(yahoo_routes("crumb123", "200 OK", QUOTE_JSON)).await;
    let lookup = YahooFinanceLookup::with_endpoints(cookie_client(), &base, &format!("{base}/cookie"));

    assert!(!lookup.lookup("ACME").await.is_error());
    assert!(!lookup.lookup("ACME").await.is_error());

    let heads = seen.lock().unwrap().clone();
    let crumb_calls = heads.iter().filter(|h| h.starts_with("GET /v1/test/getcrumb")).count();
    assert_eq!(crumb_calls, 1);
    assert_eq!(heads.len(), 4);
}

#[tokio::test]
async fn html_crumb_page_is_rejected() {
    let (base, _) = common::serve_routes(yahoo_routes("<html>consent</html>", "200 OK", QUOTE_JSON)).await;
    let lookup = YahooFinanceLookup::with_endpoints(cookie_client(), &base, &format!("{base}/cookie"));

    let rec = lookup.lookup("ACME").await;
    assert!(rec.is_error());
    assert!(rec.to_string().contains("crumb"));
}

#[tokio::test]
async fn provider_failure_becomes_error_record() {
    let (base, _) = common::serve("404 Not Found", "application/json", "{}".to_string()).await;
    let lookup = YahooFinanceLookup::with_endpoints(cookie_client(), &base, &format!("{base}/cookie"));

    let rec = lookup.lookup("NOPE").await;
    assert!(rec.is_error());
    assert!(rec.to_string().contains("404"));
}

#[tokio::test]
async fn rejected_quote_request_becomes_error_record() {
    let (base, _) = common::serve_routes(yahoo_routes("crumb123", "401 Unauthorized", "{}")).await;
    let lookup = YahooFinanceLookup::with_endpoints(cookie_client(), &base, &format!("{base}/cookie"));

    let rec = lookup.lookup("ACME").await;
    assert!(rec.is_error());
    assert!(rec.to_string().contains("401"));
}

#[tokio::test]
async fn blank_ticker_is_an_error_record() {
    let dead = common::dead_url().await;
    let lookup = YahooFinanceLookup::with_endpoints(cookie_client(), &dead, &dead);
    assert!(lookup.lookup("   ").await.is_error());
}
