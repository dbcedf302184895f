// All LLM prompt constants for the Deck module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt persona for slide generation. Combined with
/// `llm_client::prompts::PAYLOAD_ONLY_SYSTEM` at call time.
pub const SLIDE_SYSTEM: &str = "You are a Content Architect specializing in converting \
    unstructured notes into standardized presentation frameworks.";

/// Slide prompt template. Replace `{fidelity_instruction}` and `{notes}` before sending.
pub const SLIDE_PROMPT_TEMPLATE: &str = r#"Transform the notes below into a slide deck.

Return a JSON object with this EXACT schema (no extra fields):
{
  "presentation": {
    "title": "[Primary Theme]",
    "subtitle": "[Theme 1] | [Theme 2] | [Theme 3]",
    "slides": [
      {
        "title": "Introduction",
        "paragraph": "[Purpose + Topic List]",
        "bullet_points": ["Bullet point 1", "Bullet point 2"]
      },
      {
        "title": "[Topic Name]",
        "paragraph": "[Definitions, Processes, Examples]",
        "bullet_points": ["Bullet point 1", "Bullet point 2"]
      },
      {
        "title": "Conclusion",
        "paragraph": "[Cross-topic insights + Next steps]",
        "bullet_points": ["Bullet point 1", "Bullet point 2"]
      }
    ]
  }
}

Rules:
- title: at most 5 words, a noun phrase (e.g. "AI-Driven Logistics").
- subtitle: 3-7 word phrases separated by pipes (e.g. "Automation | Cost Control").
- paragraph: explanations longer than two sentences. Omit the key if a slide has none.
- bullet_points: concise, one idea each, no leading markers.
- Order topics logically (Foundation → Applications → Challenges).
- The Introduction slide previews every topic; the Conclusion synthesizes across topics.
- Map every topic in the notes. Do not merge unrelated concepts.
- Keep formulas as plain strings (not LaTeX), and keep every numerical value
  ($2,000, 6%, 120 months), methodological step and comparative statement.

{fidelity_instruction}

<notes>
{notes}
</notes>"#;

/// System prompt for turning a chat transcript into notes.
pub const NOTE_EXTRACTION_SYSTEM: &str = "You are a knowledge extraction and synthesis \
    assistant. You act as a meticulous knowledge architect, producing highly detailed and \
    comprehensive analyses of conversations.";

/// Note extraction template. Replace `{fidelity_instruction}` and `{chat_data}` before sending.
pub const NOTE_EXTRACTION_PROMPT_TEMPLATE: &str = r#"Produce detailed study notes from the conversation below.

Process:
1. Read the whole transcript once for its flow, purpose and overarching themes.
2. Segment the content into conceptual clusters. Keep every example, data point,
   formula and calculation with the cluster it belongs to.
3. Cross-check the notes against the transcript for accuracy. Note ambiguities or
   gaps and say what detail is missing.
4. Remove redundancy, consolidate similar concepts, and add short bridges between ideas.

Output:
- A standalone analysis that someone who has not read the chat can follow.
- Every formula with an explanation of its terms.
- A hierarchy of key concepts (an indented tree is fine) showing how they connect.
- The critical takeaways, each with its supporting example or figure.

Analyze ONLY the content inside the <chat_transcription> tags.

{fidelity_instruction}

<chat_transcription>
{chat_data}
</chat_transcription>"#;

/// Notes assembled from fetched paper summaries. Replace `{topic}` and `{summaries}`.
pub const RESEARCH_NOTES_TEMPLATE: &str = r#"Research topic: {topic}

The following paper summaries were collected for this topic. Present the main ideas,
methods and findings of each paper, then compare them.

{summaries}"#;
