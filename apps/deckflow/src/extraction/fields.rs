//! Recognized field-name variants for slide payloads.
//!
//! Matching ignores case and the separators `_`, `-` and space, so `bullet_points`,
//! `BulletPoints` and `BULLET-POINTS` are the same key.

/// Canonical form used for every name comparison.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Table of accepted names per field. Entries are stored normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    /// Wrapper object (JSON) or root tag (tag mode).
    pub root: Vec<String>,
    pub title: Vec<String>,
    pub subtitle: Vec<String>,
    /// Container holding the repeated section blocks.
    pub sections: Vec<String>,
    /// One repeated section block (tag mode).
    pub section: Vec<String>,
    pub paragraph: Vec<String>,
    /// Container holding a section's bullets.
    pub bullets: Vec<String>,
    /// One bullet element (tag mode).
    pub bullet: Vec<String>,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self::new(
            &["PowerPoint", "Presentation", "Deck"],
            &["Title", "Heading"],
            &["Subtitle", "Sub_Title", "Tagline"],
            &["Slides", "Sections"],
            &["Slide", "Section"],
            &["Paragraph", "Concept", "Body", "Content"],
            &["Bullet_Points", "Bullets", "Points", "Key_Points"],
            &["BulletPoint", "Bullet", "Point", "Li"],
        )
    }
}

impl FieldNames {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        root: &[&str],
        title: &[&str],
        subtitle: &[&str],
        sections: &[&str],
        section: &[&str],
        paragraph: &[&str],
        bullets: &[&str],
        bullet: &[&str],
    ) -> Self {
        let table = |names: &[&str]| names.iter().map(|n| normalize_key(n)).collect();
        Self {
            root: table(root),
            title: table(title),
            subtitle: table(subtitle),
            sections: table(sections),
            section: table(section),
            paragraph: table(paragraph),
            bullets: table(bullets),
            bullet: table(bullet),
        }
    }

    /// Replaces the accepted root names (e.g. from `DECK_ROOT_TAGS`).
    pub fn with_root_names(mut self, names: &[&str]) -> Self {
        self.root = names.iter().map(|n| normalize_key(n)).collect();
        self
    }
}

/// True if `key` matches any entry of `names` (entries already normalized).
pub fn matches_any(names: &[String], key: &str) -> bool {
    let key = normalize_key(key);
    names.iter().any(|n| *n == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_ignores_case_and_separators() {
        assert_eq!(normalize_key("Bullet_Points"), "bulletpoints");
        assert_eq!(normalize_key("BULLET-POINTS"), "bulletpoints");
        assert_eq!(normalize_key("bullet points"), "bulletpoints");
        assert_eq!(normalize_key("TITLE"), "title");
    }

    #[test]
    fn test_matches_any_default_table() {
        let names = FieldNames::default();
        assert!(matches_any(&names.title, "Title"));
        assert!(matches_any(&names.title, "TITLE"));
        assert!(matches_any(&names.root, "powerpoint"));
        assert!(matches_any(&names.bullets, "bulletPoints"));
        assert!(matches_any(&names.bullet, "BULLETPOINT"));
        assert!(!matches_any(&names.subtitle, "title"));
    }

    #[test]
    fn test_with_root_names_overrides_roots_only() {
        let names = FieldNames::default().with_root_names(&["Report"]);
        assert!(matches_any(&names.root, "REPORT"));
        assert!(!matches_any(&names.root, "PowerPoint"));
        assert!(matches_any(&names.title, "title"));
    }
}
