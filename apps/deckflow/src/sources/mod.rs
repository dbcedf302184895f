//! Source records — parallel fetch fan-out and the single-writer merge.
//!
//! Workers only return their own results. Deduplication and ID assignment happen
//! once, sequentially, after every worker has finished; there is no shared "seen"
//! set and no lock.
//!
//! Concrete network fetchers (arXiv, web search) live outside this crate and plug in
//! through `SourceFetcher`.

pub mod transcript;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Fetch failed for query '{query}': {message}")]
    Fetch { query: String, message: String },
}

/// One fetched source, e.g. a paper with its abstract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub title: String,
    pub summary: String,
    pub links: Vec<String>,
}

/// A record after the merge, carrying its assigned ID (from 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedRecord {
    pub id: u32,
    #[serde(flatten)]
    pub record: SourceRecord,
}

/// Fetches records for one query. Carried as `Arc<dyn SourceFetcher>`.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Vec<SourceRecord>, SourceError>;
}

/// Runs one task per query and collects the batches in submission order.
///
/// A failed query (or a panicked task) is logged and skipped; the others still count.
pub async fn fetch_all(
    fetcher: Arc<dyn SourceFetcher>,
    queries: &[String],
) -> Vec<Vec<SourceRecord>> {
    let handles: Vec<_> = queries
        .iter()
        .cloned()
        .map(|query| {
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { fetcher.fetch(&query).await })
        })
        .collect();

    let mut batches = Vec::with_capacity(handles.len());
    for (query, handle) in queries.iter().zip(handles) {
        match handle.await {
            Ok(Ok(records)) => batches.push(records),
            Ok(Err(e)) => warn!("Skipping source query '{query}': {e}"),
            Err(e) => warn!("Source task for '{query}' did not complete: {e}"),
        }
    }

    info!(
        "Fetched {} of {} source batches",
        batches.len(),
        queries.len()
    );
    batches
}

/// Deduplicates on `(title, links)` and assigns IDs 1, 2, 3… in batch order.
/// The first occurrence of a duplicate wins.
pub fn merge_records(batches: Vec<Vec<SourceRecord>>) -> Vec<IdentifiedRecord> {
    let mut seen: HashSet<(String, Vec<String>)> = HashSet::new();
    let mut merged = Vec::new();

    for record in batches.into_iter().flatten() {
        if !seen.insert((record.title.clone(), record.links.clone())) {
            continue;
        }
        let id = merged.len() as u32 + 1;
        merged.push(IdentifiedRecord { id, record });
    }
    merged
}

/// Wraps each record in `<research_paper_summary>` tags for the slide prompt.
pub fn format_research_summaries(records: &[IdentifiedRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "\t<research_paper_summary>\n{}\n{}</research_paper_summary>",
                r.record.title.trim(),
                r.record.summary.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
