use serde::{Deserialize, Serialize};

/// A validated slide deck recovered from model output.
///
/// Built once per extraction call and never mutated afterwards.
/// `sections` order is the narrative order (introduction → topics → conclusion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    /// May be empty, but the source payload must have carried the field.
    pub subtitle: String,
    pub sections: Vec<Section>,
}

/// One slide's worth of source content before pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub paragraph: Option<String>,
    /// Each bullet is atomic: the flow engine never splits one.
    pub bullets: Vec<String>,
}

impl Section {
    /// True if the section carries a non-blank paragraph or at least one bullet.
    pub fn has_content(&self) -> bool {
        self.paragraph
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
            || !self.bullets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(paragraph: Option<&str>, bullets: &[&str]) -> Section {
        Section {
            title: "Intro".to_string(),
            paragraph: paragraph.map(str::to_string),
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
        }
    }

    #[test]
    fn test_has_content_paragraph_only() {
        assert!(section(Some("Body"), &[]).has_content());
    }

    #[test]
    fn test_has_content_bullets_only() {
        assert!(section(None, &["one"]).has_content());
    }

    #[test]
    fn test_has_content_empty_paragraph_no_bullets() {
        assert!(!section(Some(""), &[]).has_content());
        assert!(!section(None, &[]).has_content());
    }

    #[test]
    fn test_has_content_whitespace_paragraph_no_bullets() {
        assert!(!section(Some("  \n\t "), &[]).has_content());
        assert!(section(Some("  "), &["b"]).has_content());
    }

    #[test]
    fn test_document_serde_shape() {
        let doc = Document {
            title: "Deck".to_string(),
            subtitle: String::new(),
            sections: vec![section(None, &["a"])],
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["title"], "Deck");
        assert_eq!(value["sections"][0]["bullets"][0], "a");
        assert!(value["sections"][0]["paragraph"].is_null());
    }
}
