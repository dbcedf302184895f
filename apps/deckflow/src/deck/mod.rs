// Deck pipeline: source material → LLM completion → extraction → pagination plan.
// All LLM calls go through llm_client::CompletionProvider.

pub mod generator;
pub mod handlers;
pub mod planner;
pub mod prompts;
