//! JSON payloads: `{"presentation": {"title", "subtitle", "slides": [...]}}`.

use serde_json::{Map, Value};
use tracing::warn;

use crate::extraction::fields::{matches_any, normalize_key, FieldNames};
use crate::extraction::{assemble_section, normalize_text, split_bullet_lines, ExtractError};
use crate::models::document::{Document, Section};

/// First entry whose key matches one of `names`.
fn lookup<'v>(object: &'v Map<String, Value>, names: &[String]) -> Option<&'v Value> {
    object
        .iter()
        .find(|(key, _)| matches_any(names, key))
        .map(|(_, value)| value)
}

/// Scalar text of a value. Arrays of scalars are joined with spaces; `null`,
/// objects and nested arrays have no text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter(|v| !v.is_array())
                .filter_map(scalar_text)
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Maps a parsed JSON object to a Document, descending an optional root wrapper.
pub fn map_json(value: &Value, fields: &FieldNames) -> Result<Document, ExtractError> {
    let Value::Object(outer) = value else {
        return Err(ExtractError::MalformedPayload {
            reason: "payload is not a JSON object".to_string(),
        });
    };
    let object = match lookup(outer, &fields.root) {
        Some(Value::Object(inner)) => inner,
        _ => outer,
    };

    let title = lookup(object, &fields.title)
        .and_then(scalar_text)
        .map(|t| normalize_text(&t))
        .filter(|t| !t.is_empty())
        .ok_or(ExtractError::MissingRequiredField { field: "title" })?;
    let subtitle = lookup(object, &fields.subtitle)
        .filter(|v| !v.is_null())
        .map(|v| scalar_text(v).map(|s| normalize_text(&s)).unwrap_or_default())
        .ok_or(ExtractError::MissingRequiredField { field: "subtitle" })?;

    let mut blocks = Vec::new();
    if let Some(container) = lookup(object, &fields.sections) {
        collect_section_objects(container, fields, &mut blocks);
    }
    let sections = blocks
        .into_iter()
        .enumerate()
        .filter_map(|(index, block)| map_section(index, block, fields))
        .collect();

    Ok(Document {
        title,
        subtitle,
        sections,
    })
}

/// Accepts `[{..}, {..}]`, a single `{..}`, or the XML-converted shape
/// `{"slide": [{..}, {..}]}`.
fn collect_section_objects<'v>(
    container: &'v Value,
    fields: &FieldNames,
    out: &mut Vec<&'v Map<String, Value>>,
) {
    match container {
        Value::Array(items) => {
            for item in items {
                if let Value::Object(block) = item {
                    out.push(block);
                }
            }
        }
        Value::Object(block) => match lookup(block, &fields.section) {
            Some(inner) => collect_section_objects(inner, fields, out),
            None => out.push(block),
        },
        _ => {}
    }
}

fn map_section(index: usize, block: &Map<String, Value>, fields: &FieldNames) -> Option<Section> {
    let title = lookup(block, &fields.title).and_then(scalar_text);
    let paragraph = lookup(block, &fields.paragraph).and_then(scalar_text);
    let bullets = match lookup(block, &fields.bullets) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(position, item)| bullet_text(index, position, item, fields))
            .collect(),
        Some(Value::String(text)) => split_bullet_lines(text),
        _ => Vec::new(),
    };
    assemble_section(index, title, paragraph, bullets)
}

/// Text of one bullet array item. Objects (`{"text": ".."}`) yield their bullet,
/// `text` or paragraph-like field.
fn bullet_text(section: usize, position: usize, item: &Value, fields: &FieldNames) -> Option<String> {
    let Value::Object(object) = item else {
        return scalar_text(item);
    };
    let text = lookup(object, &fields.bullet)
        .or_else(|| {
            object
                .iter()
                .find(|(key, _)| normalize_key(key) == "text")
                .map(|(_, value)| value)
        })
        .or_else(|| lookup(object, &fields.paragraph))
        .and_then(scalar_text);
    if text.is_none() {
        warn!(section, bullet = position, "Dropping bullet object without a text field");
    }
    text
}
