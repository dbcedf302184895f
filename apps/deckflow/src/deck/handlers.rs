//! Axum route handlers for the Deck API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::deck::generator::{generate_document, DeckSource};
use crate::deck::planner::{plan_deck, PlannedPage};
use crate::errors::AppError;
use crate::layout::{FlowEngine, PageFill};
use crate::models::document::Document;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub raw_output: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateDeckRequest {
    pub source: DeckSource,
}

/// Owned, serializable view of one planned body page.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    /// 1-based, counting body pages only (the title page is implicit).
    pub page_number: usize,
    pub section_index: usize,
    pub section_title: String,
    pub paragraph: Option<String>,
    pub bullets: Vec<String>,
    pub is_continuation: bool,
    pub font_size: u16,
    pub may_overflow: bool,
    pub fill: PageFill,
}

impl PageView {
    fn from_planned(index: usize, page: &PlannedPage<'_>) -> Self {
        let fragment = &page.fragment;
        Self {
            page_number: index + 1,
            section_index: fragment.source_section_index,
            section_title: fragment.section_title.to_string(),
            paragraph: fragment.display_paragraph().map(str::to_string),
            bullets: fragment.bullets.to_vec(),
            is_continuation: fragment.is_continuation,
            font_size: fragment.chosen_font_size,
            may_overflow: fragment.may_overflow,
            fill: page.fill,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeckResponse {
    pub deck_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub document: Document,
    pub pages: Vec<PageView>,
}

/// Lays out `document` with the configured budget and metrics.
fn build_response(state: &AppState, document: Document) -> DeckResponse {
    let engine = FlowEngine::new(state.metrics.as_ref(), &state.budget);
    let pages = {
        let plan = plan_deck(&document, &engine);
        plan.pages
            .iter()
            .enumerate()
            .map(|(i, page)| PageView::from_planned(i, page))
            .collect()
    };

    DeckResponse {
        deck_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        document,
        pages,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/decks/layout
///
/// Extracts a Document from already-generated model output and paginates it.
/// No LLM call; useful for replaying stored completions.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<DeckResponse>, AppError> {
    if request.raw_output.trim().is_empty() {
        return Err(AppError::Validation("raw_output cannot be empty".to_string()));
    }

    let document = state.extractor.extract(&request.raw_output)?;
    let response = build_response(&state, document);

    info!(
        "Laid out deck {} with {} pages",
        response.deck_id,
        response.pages.len()
    );
    Ok(Json(response))
}

/// POST /api/v1/decks/generate
///
/// Full pipeline: source → notes → slide completion → extraction → layout.
/// Requires ANTHROPIC_API_KEY; returns 503 otherwise.
///
/// `research` sources run through `AppState::fetcher`. The binary ships without a
/// fetcher, so they answer 400 unless one is injected in `AppState::from_config`;
/// callers can submit already fetched `papers` batches instead.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateDeckRequest>,
) -> Result<Json<DeckResponse>, AppError> {
    let llm = state.llm.clone().ok_or(AppError::LlmUnavailable)?;

    let document = generate_document(
        llm.as_ref(),
        &state.extractor,
        state.fetcher.clone(),
        &request.source,
    )
    .await?;
    let response = build_response(&state, document);

    info!(
        "Generated deck {} '{}' with {} pages",
        response.deck_id,
        response.document.title,
        response.pages.len()
    );
    Ok(Json(response))
}
