// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// System prompt fragment that asks for a bare payload.
pub const PAYLOAD_ONLY_SYSTEM: &str = "Respond with the requested structure only. \
    Do NOT include any text before or after it. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to prompts that must not add facts absent from the source material.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: Use only information present in the provided material. \
    Keep every formula, number and named method exactly as written. \
    Do NOT invent examples, figures or citations.";
