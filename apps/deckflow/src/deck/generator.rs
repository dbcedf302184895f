//! Deck Generation — source material → notes → slide completion → Document.
//!
//! Flow: prepare notes (transcript note-extraction, paper merge) → slide prompt →
//!       completion → extraction, regenerating on extraction failure.
//!
//! Extraction never guesses a partial Document. When the model's output cannot be
//! recovered, the slide completion is requested again, up to
//! `MAX_GENERATION_ATTEMPTS` times in total.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::deck::prompts::{
    NOTE_EXTRACTION_PROMPT_TEMPLATE, NOTE_EXTRACTION_SYSTEM, RESEARCH_NOTES_TEMPLATE,
    SLIDE_PROMPT_TEMPLATE, SLIDE_SYSTEM,
};
use crate::errors::AppError;
use crate::extraction::{ExtractError, Extractor};
use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, PAYLOAD_ONLY_SYSTEM};
use crate::llm_client::CompletionProvider;
use crate::models::document::Document;
use crate::sources::transcript::{format_transcript, ChatMessage};
use crate::sources::{fetch_all, format_research_summaries, merge_records, SourceFetcher, SourceRecord};

/// Total slide completions requested before giving up on extraction.
pub const MAX_GENERATION_ATTEMPTS: u32 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// What a deck is generated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeckSource {
    /// Free-form notes, used as-is.
    Notes { text: String },
    /// A scraped conversation; turned into notes by an extra completion first.
    Transcript { messages: Vec<ChatMessage> },
    /// Paper batches already fetched per query; merged before prompting.
    Papers {
        topic: String,
        batches: Vec<Vec<SourceRecord>>,
    },
    /// Queries to run through the configured `SourceFetcher`. Rejected as a
    /// validation error when no fetcher is wired into `AppState`.
    Research { topic: String, queries: Vec<String> },
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the generation pipeline and returns the extracted Document.
///
/// Steps:
/// 1. prepare_notes() → notes text (may call the LLM or the fetcher)
/// 2. build_slide_prompt() → prompt
/// 3. LLM completion → Extractor::extract (retried on ExtractError)
pub async fn generate_document(
    llm: &dyn CompletionProvider,
    extractor: &Extractor,
    fetcher: Option<Arc<dyn SourceFetcher>>,
    source: &DeckSource,
) -> Result<Document, AppError> {
    let notes = prepare_notes(llm, fetcher, source).await?;
    info!("Prepared {} chars of notes for slide generation", notes.len());

    let prompt = build_slide_prompt(&notes);
    let system = format!("{SLIDE_SYSTEM} {PAYLOAD_ONLY_SYSTEM}");

    let mut last_error: Option<ExtractError> = None;
    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let raw = llm.complete(&prompt, &system).await?;

        match extractor.extract(&raw) {
            Ok(document) => {
                info!(
                    "Extracted deck '{}' with {} sections (attempt {}/{})",
                    document.title,
                    document.sections.len(),
                    attempt,
                    MAX_GENERATION_ATTEMPTS
                );
                return Ok(document);
            }
            Err(e) => {
                warn!(
                    "Generation attempt {}/{} failed extraction: {}",
                    attempt, MAX_GENERATION_ATTEMPTS, e
                );
                last_error = Some(e);
            }
        }
    }

    Err(AppError::Extraction(last_error.unwrap_or(
        ExtractError::MalformedPayload {
            reason: "no completion was requested".to_string(),
        },
    )))
}

/// Turns the source into plain notes for the slide prompt.
async fn prepare_notes(
    llm: &dyn CompletionProvider,
    fetcher: Option<Arc<dyn SourceFetcher>>,
    source: &DeckSource,
) -> Result<String, AppError> {
    match source {
        DeckSource::Notes { text } => {
            if text.trim().is_empty() {
                return Err(AppError::Validation("notes cannot be empty".to_string()));
            }
            Ok(text.clone())
        }
        DeckSource::Transcript { messages } => {
            if messages.iter().all(|m| m.content.trim().is_empty()) {
                return Err(AppError::Validation(
                    "transcript has no message content".to_string(),
                ));
            }
            info!("Extracting notes from a {}-message transcript", messages.len());
            let prompt = build_note_extraction_prompt(messages);
            Ok(llm.complete(&prompt, NOTE_EXTRACTION_SYSTEM).await?)
        }
        DeckSource::Papers { topic, batches } => papers_to_notes(topic, batches.clone()),
        DeckSource::Research { topic, queries } => {
            let fetcher = fetcher.ok_or_else(|| {
                AppError::Validation(
                    "no source fetcher is configured; submit fetched paper batches instead"
                        .to_string(),
                )
            })?;
            if queries.is_empty() {
                return Err(AppError::Validation("queries cannot be empty".to_string()));
            }
            let batches = fetch_all(fetcher, queries).await;
            papers_to_notes(topic, batches)
        }
    }
}

fn papers_to_notes(topic: &str, batches: Vec<Vec<SourceRecord>>) -> Result<String, AppError> {
    let records = merge_records(batches);
    if records.is_empty() {
        return Err(AppError::Validation(format!(
            "no paper summaries available for topic '{topic}'"
        )));
    }
    info!("Merged {} unique papers for topic '{}'", records.len(), topic);
    Ok(RESEARCH_NOTES_TEMPLATE
        .replace("{topic}", topic)
        .replace("{summaries}", &format_research_summaries(&records)))
}

fn build_slide_prompt(notes: &str) -> String {
    SLIDE_PROMPT_TEMPLATE
        .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
        .replace("{notes}", notes)
}

fn build_note_extraction_prompt(messages: &[ChatMessage]) -> String {
    NOTE_EXTRACTION_PROMPT_TEMPLATE
        .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
        .replace("{chat_data}", &format_transcript(messages))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
