use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::extraction::fields::FieldNames;
use crate::extraction::Extractor;
use crate::layout::{metrics_for, PageBudget, TextMetrics};
use crate::llm_client::CompletionProvider;
use crate::sources::SourceFetcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when ANTHROPIC_API_KEY is unset; generation then answers 503.
    pub llm: Option<Arc<dyn CompletionProvider>>,
    /// Pluggable paper fetcher for `research` sources. No built-in implementation.
    pub fetcher: Option<Arc<dyn SourceFetcher>>,
    pub extractor: Arc<Extractor>,
    pub budget: Arc<PageBudget>,
    /// Height estimation strategy selected by DECK_METRICS.
    pub metrics: Arc<dyn TextMetrics>,
}

impl AppState {
    /// Builds the layout and extraction pieces from config. LLM and fetcher are
    /// injected by the caller.
    pub fn from_config(
        config: Config,
        llm: Option<Arc<dyn CompletionProvider>>,
        fetcher: Option<Arc<dyn SourceFetcher>>,
    ) -> Result<Self> {
        let budget = config.page_budget()?;

        let fields = match &config.root_tags {
            Some(tags) => {
                let names: Vec<&str> = tags.iter().map(String::as_str).collect();
                FieldNames::default().with_root_names(&names)
            }
            None => FieldNames::default(),
        };

        Ok(Self {
            metrics: Arc::from(metrics_for(config.metrics)),
            extractor: Arc::new(Extractor::new(fields)),
            budget: Arc::new(budget),
            llm,
            fetcher,
            config,
        })
    }
}
