//! Output Extraction — recovers a validated `Document` from semi-structured model output.
//!
//! Flow: isolate candidate regions (JSON object, root tag) → try them in order of
//! their start offset → map fields case-insensitively → normalize text.
//!
//! Extraction never guesses: if no candidate isolates and parses, or a required field
//! is missing, the call fails and the caller decides whether to regenerate.

pub mod fields;
pub mod json_payload;
pub mod payload;
pub mod tag_payload;

use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::fields::FieldNames;
use crate::extraction::payload::{find_tag_region, scan_json, JsonScan};
use crate::models::document::{Document, Section};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("Missing required field: {field}")]
    MissingRequiredField { field: &'static str },
}

/// Extractor configured with a field-name table. Stateless; safe to share.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    fields: FieldNames,
}

impl Extractor {
    pub fn new(fields: FieldNames) -> Self {
        Self { fields }
    }

    /// Extracts a Document from raw model output.
    ///
    /// JSON regions and the root tag region are tried in order of where they start
    /// in `raw`. A JSON region that does not parse is skipped and scanning resumes
    /// after it; an unbalanced `{` ends JSON scanning. The first region that parses
    /// decides the result, including its field errors.
    pub fn extract(&self, raw: &str) -> Result<Document, ExtractError> {
        if raw.trim().is_empty() {
            return Err(ExtractError::MalformedPayload {
                reason: "output is empty".to_string(),
            });
        }

        let tag_region = find_tag_region(raw, &self.fields.root);
        let mut failure = "no JSON object or root tag found";
        let mut from = 0;

        loop {
            let json_region = match scan_json(raw, from) {
                JsonScan::Found(region) => Some(region),
                JsonScan::Unbalanced { start } => {
                    debug!(start, "Unbalanced JSON object; stopping JSON scan");
                    failure = "JSON object is truncated or unbalanced";
                    None
                }
                JsonScan::NoBrace => None,
            };

            if let Some(tag) = tag_region {
                if json_region.map_or(true, |json| tag.start < json.start) {
                    debug!(start = tag.start, "Extracting tag-delimited payload");
                    return tag_payload::map_tags(tag.slice(raw), &self.fields);
                }
            }

            let Some(json) = json_region else { break };
            match serde_json::from_str::<serde_json::Value>(json.slice(raw)) {
                Ok(value) => {
                    debug!(start = json.start, "Extracting JSON payload");
                    return json_payload::map_json(&value, &self.fields);
                }
                Err(e) => {
                    debug!(start = json.start, error = %e, "Skipping unparseable JSON region");
                    failure = "no JSON region parsed";
                    from = json.end;
                }
            }
        }

        Err(ExtractError::MalformedPayload {
            reason: failure.to_string(),
        })
    }
}

/// Extracts with the default field-name table.
pub fn extract_document(raw: &str) -> Result<Document, ExtractError> {
    Extractor::default().extract(raw)
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization shared by both payload shapes
// ────────────────────────────────────────────────────────────────────────────

/// Collapses whitespace runs to a single space and trims.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a bullet list written as one string into items, stripping list markers.
pub fn split_bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix(&['-', '*', '•'][..])
                .map_or(line, str::trim_start)
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Normalizes raw section fields. Returns `None` for sections that must be dropped:
/// no title, or neither paragraph nor bullets.
pub(crate) fn assemble_section(
    index: usize,
    title: Option<String>,
    paragraph: Option<String>,
    bullets: Vec<String>,
) -> Option<Section> {
    let title = title.map(|t| normalize_text(&t)).unwrap_or_default();
    let paragraph = paragraph
        .map(|p| normalize_text(&p))
        .filter(|p| !p.is_empty());
    let bullets: Vec<String> = bullets
        .iter()
        .map(|b| normalize_text(b))
        .filter(|b| !b.is_empty())
        .collect();

    if title.is_empty() {
        warn!(section = index, "Dropping section without a title");
        return None;
    }
    if paragraph.is_none() && bullets.is_empty() {
        debug!(section = index, title = %title, "Dropping empty section");
        return None;
    }
    Some(Section {
        title,
        paragraph,
        bullets,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_OUTPUT: &str = r#"Sure, here is the result:
```json
{"presentation": {"title": "X", "subtitle": "Y", "slides": [{"title": "A", "paragraph": "p", "bullet_points": ["b1", "b2"]}]}}
```
Let me know if you need changes."#;

    const TAG_OUTPUT: &str = "Here you go.\n<POWERPOINT>\n  <TITLE>Deck</TITLE>\n  <subtitle>Notes</subtitle>\n  \
        <Slide><Title>Intro</Title><Concept>First   idea</Concept><BulletPoint>one</BulletPoint>\
        <BulletPoint>  two\n words </BulletPoint></Slide>\n</POWERPOINT>\nDone.";

    #[test]
    fn test_json_wrapped_in_prose_and_fences() {
        let doc = extract_document(JSON_OUTPUT).expect("document");
        assert_eq!(doc.title, "X");
        assert_eq!(doc.subtitle, "Y");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "A");
        assert_eq!(doc.sections[0].paragraph.as_deref(), Some("p"));
        assert_eq!(doc.sections[0].bullets, vec!["b1", "b2"]);
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let raw = r#"{"presentation": {"title": "X", "subtitle": "Y", "slides": [{"title": "A""#;
        let err = extract_document(raw).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedPayload { .. }), "got {err:?}");
    }

    #[test]
    fn test_empty_output_is_malformed() {
        assert!(matches!(
            extract_document("   "),
            Err(ExtractError::MalformedPayload { .. })
        ));
        assert!(matches!(
            extract_document("I could not produce slides for this input."),
            Err(ExtractError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_tag_output_case_insensitive() {
        let doc = extract_document(TAG_OUTPUT).expect("document");
        assert_eq!(doc.title, "Deck");
        assert_eq!(doc.subtitle, "Notes");
        assert_eq!(doc.sections[0].paragraph.as_deref(), Some("First idea"));
        assert_eq!(doc.sections[0].bullets, vec!["one", "two words"]);
    }

    #[test]
    fn test_comparison_in_leading_prose_does_not_hide_root() {
        let raw = "Keep in mind cost < budget. <PowerPoint><Title>T</Title><Subtitle>S</Subtitle>\
                   <Slide><Title>Plan</Title><BulletPoint>a < b</BulletPoint></Slide></PowerPoint>";
        let doc = extract_document(raw).expect("document");
        assert_eq!(doc.title, "T");
        assert_eq!(doc.sections[0].bullets, vec!["a < b"]);
    }

    #[test]
    fn test_json_key_case_insensitive() {
        let raw = r#"{"Title": "X", "SubTitle": "Y", "SLIDES": [{"Title": "A", "Bullet_Points": ["b"]}]}"#;
        let doc = extract_document(raw).expect("document");
        assert_eq!(doc.title, "X");
        assert_eq!(doc.sections[0].bullets, vec!["b"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = Extractor::default();
        assert_eq!(extractor.extract(JSON_OUTPUT), extractor.extract(JSON_OUTPUT));
        assert_eq!(extractor.extract(TAG_OUTPUT), extractor.extract(TAG_OUTPUT));
    }

    #[test]
    fn test_missing_subtitle() {
        let raw = r#"{"title": "X", "slides": [{"title": "A", "paragraph": "p"}]}"#;
        assert_eq!(
            extract_document(raw),
            Err(ExtractError::MissingRequiredField { field: "subtitle" })
        );
        let raw = "<PowerPoint><Title>X</Title><Slide><Title>A</Title><Body>p</Body></Slide></PowerPoint>";
        assert_eq!(
            extract_document(raw),
            Err(ExtractError::MissingRequiredField { field: "subtitle" })
        );
    }

    #[test]
    fn test_empty_sections_dropped_and_zero_sections_allowed() {
        let raw = r#"{"title": "X", "subtitle": "", "slides": [{"title": "A"}, {"title": "B", "bullet_points": []}]}"#;
        let doc = extract_document(raw).expect("document");
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_braces_inside_strings() {
        let raw = r#"Result: {"title": "Sets {x}", "subtitle": "a \"}\" b", "slides": [{"title": "S", "paragraph": "A = {1, 2}"}]} end"#;
        let doc = extract_document(raw).expect("document");
        assert_eq!(doc.title, "Sets {x}");
        assert_eq!(doc.subtitle, "a \"}\" b");
        assert_eq!(doc.sections[0].paragraph.as_deref(), Some("A = {1, 2}"));
    }

    #[test]
    fn test_skips_unparseable_region_before_payload() {
        let raw = r#"Template: {title: ...} Output: {"title": "X", "subtitle": "Y", "slides": []}"#;
        let doc = extract_document(raw).expect("document");
        assert_eq!(doc.title, "X");
    }

    #[test]
    fn test_earliest_candidate_wins() {
        let raw = "<Deck><Title>From tags</Title><Subtitle>s</Subtitle>\
                   <Slide><Title>A</Title><Body>{\"title\": \"inner\"}</Body></Slide></Deck>";
        let doc = extract_document(raw).expect("document");
        assert_eq!(doc.title, "From tags");

        let raw = r#"{"title": "From JSON", "subtitle": "s", "slides": [{"title": "A", "paragraph": "<Deck></Deck>"}]}"#;
        let doc = extract_document(raw).expect("document");
        assert_eq!(doc.title, "From JSON");
    }

    #[test]
    fn test_custom_root_names() {
        let extractor = Extractor::new(FieldNames::default().with_root_names(&["Report"]));
        let raw = "<report><title>R</title><subtitle></subtitle></report>";
        let doc = extractor.extract(raw).expect("document");
        assert_eq!(doc.title, "R");
        assert!(extractor.extract("<PowerPoint><Title>X</Title><Subtitle/></PowerPoint>").is_err());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a \n\t b\u{a0} c  "), "a b c");
        assert_eq!(normalize_text(" \n "), "");
    }

    #[test]
    fn test_split_bullet_lines() {
        assert_eq!(
            split_bullet_lines("- one\n*two\n\n  • three  \nfour"),
            vec!["one", "two", "three", "four"]
        );
    }
}
