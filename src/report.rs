//! report.rs: title dedup, date sort and the console listing.

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::ingest::types::NewsRecord;

/// Shown instead of a table when nothing survived.
pub const NO_RESULTS: &str = "No mergers and acquisitions found this week.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Lexical order of the raw pubDate strings, descending. Only chronological
    /// when every row uses the same date layout.
    #[default]
    Raw,
    /// Parsed timestamps, newest first.
    Chronological,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Zero-based position after sorting.
    pub index: usize,
    #[serde(flatten)]
    pub record: NewsRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.record.title.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    NoResults,
    Table(ReportTable),
}

impl Report {
    pub fn table(&self) -> Option<&ReportTable> {
        match self {
            Report::NoResults => None,
            Report::Table(t) => Some(t),
        }
    }
}

/// Keep the first record per exact title, preserving order.
/// Returns the survivors and how many were dropped.
pub fn dedup_by_title(records: Vec<NewsRecord>) -> (Vec<NewsRecord>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for r in records {
        if !seen.insert(r.title.clone()) {
            dropped += 1;
            continue;
        }
        keep.push(r);
    }
    (keep, dropped)
}

/// Descending and stable: ties keep insertion order.
pub fn sort_records(records: &mut [NewsRecord], order: SortOrder) {
    match order {
        SortOrder::Raw => records.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
        SortOrder::Chronological => records.sort_by(|a, b| b.published_ts.cmp(&a.published_ts)),
    }
}

pub fn aggregate(records: Vec<NewsRecord>, order: SortOrder) -> Report {
    if records.is_empty() {
        return Report::NoResults;
    }

    let (mut unique, dropped) = dedup_by_title(records);
    counter!("ingest_dedup_total").increment(dropped as u64);
    sort_records(&mut unique, order);

    let rows = unique
        .into_iter()
        .enumerate()
        .map(|(index, record)| ReportRow { index, record })
        .collect();
    Report::Table(ReportTable { rows })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = match self {
            Report::NoResults => return writeln!(f, "{NO_RESULTS}"),
            Report::Table(t) => t,
        };

        writeln!(f, "\n{} results found:\n", table.len())?;
        for row in &table.rows {
            let r = &row.record;
            writeln!(f, "[{}] {} | {}", row.index + 1, r.source, r.published_at)?;
            writeln!(f, "     {}", r.title)?;
            writeln!(f, "     {}\n", r.url)?;
        }
        Ok(())
    }
}

pub fn render(report: &Report) -> String {
    report.to_string()
}
