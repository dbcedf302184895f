//! Tag-delimited payloads: `<PowerPoint><Title>..</Title><Slide>..</Slide></PowerPoint>`.
//!
//! Model output is not well-formed XML. The tokenizer is a single regex pass that
//! tolerates attributes, self-closing tags, comments, processing instructions and
//! stray close tags; the tree builder closes unclosed children implicitly.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::extraction::fields::{matches_any, normalize_key, FieldNames};
use crate::extraction::{assemble_section, normalize_text, split_bullet_lines, ExtractError};
use crate::models::document::{Document, Section};

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<!\[CDATA\[(?P<cdata>.*?)\]\]>|<\?.*?\?>|<![A-Za-z][^>]*>|<(?P<close>/)?(?P<name>[A-Za-z_][\w.:\-]*)(?:[^<>"']|"[^"<]*"|'[^'<]*')*?(?P<selfclose>/)?\s*>"#,
    )
    .unwrap()
});

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]+);").unwrap());

/// One lexical unit of tag-delimited text. Tag names are normalized keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open {
        name: String,
        start: usize,
        end: usize,
        self_closing: bool,
    },
    Close {
        name: String,
        start: usize,
        end: usize,
    },
    /// Character data with entities decoded (CDATA is passed through verbatim).
    Text(String),
}

pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in MARKUP_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > cursor {
            tokens.push(Token::Text(decode_entities(&text[cursor..whole.start()])));
        }
        cursor = whole.end();

        if let Some(cdata) = caps.name("cdata") {
            tokens.push(Token::Text(cdata.as_str().to_string()));
            continue;
        }
        let Some(name) = caps.name("name") else {
            // Comment, processing instruction or doctype.
            continue;
        };
        let name = normalize_key(name.as_str());
        if caps.name("close").is_some() {
            tokens.push(Token::Close {
                name,
                start: whole.start(),
                end: whole.end(),
            });
        } else {
            tokens.push(Token::Open {
                name,
                start: whole.start(),
                end: whole.end(),
                self_closing: caps.name("selfclose").is_some(),
            });
        }
    }
    if cursor < text.len() {
        tokens.push(Token::Text(decode_entities(&text[cursor..])));
    }
    tokens
}

/// Decodes the five XML entities, `&nbsp;` and numeric references.
/// Unknown entities are left as written.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Element tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Normalized tag name.
    pub name: String,
    pub children: Vec<Node>,
}

impl Element {
    fn named(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    /// Concatenated text of all descendants, skipping subtrees named in `skip`.
    pub fn text_excluding(&self, skip: &[String]) -> String {
        let mut out = String::new();
        self.collect_text_excluding(skip, &mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        self.collect_text_excluding(&[], out);
    }

    fn collect_text_excluding(&self, skip: &[String], out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) if matches_any(skip, &e.name) => {}
                Node::Element(e) => e.collect_text_excluding(skip, out),
            }
        }
    }

    /// First direct child whose name is in `names`.
    pub fn child(&self, names: &[String]) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(e) if matches_any(names, &e.name) => Some(e),
            _ => None,
        })
    }

    /// Descendants whose name is in `names`, without descending into a match.
    pub fn outermost<'e>(&'e self, names: &[String], out: &mut Vec<&'e Element>) {
        for node in &self.children {
            if let Node::Element(e) = node {
                if matches_any(names, &e.name) {
                    out.push(e);
                } else {
                    e.outermost(names, out);
                }
            }
        }
    }
}

fn attach(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Builds an element tree from `text` and returns its first top-level element.
pub fn parse_tree(text: &str) -> Option<Element> {
    // Index 0 is a nameless document node; tag names are never empty, so no
    // close tag can pop it.
    let mut stack = vec![Element::default()];

    for token in tokenize(text) {
        match token {
            Token::Open {
                name,
                self_closing: true,
                ..
            } => attach(&mut stack, Node::Element(Element::named(name))),
            Token::Open { name, .. } => stack.push(Element::named(name)),
            Token::Close { name, .. } => {
                // A close tag with no open ancestor is ignored. Otherwise it also
                // closes every child still open above that ancestor.
                let Some(pos) = stack.iter().rposition(|e| e.name == name) else {
                    continue;
                };
                while stack.len() > pos.max(1) {
                    if let Some(done) = stack.pop() {
                        attach(&mut stack, Node::Element(done));
                    }
                }
            }
            Token::Text(t) => attach(&mut stack, Node::Text(t)),
        }
    }
    while stack.len() > 1 {
        if let Some(done) = stack.pop() {
            attach(&mut stack, Node::Element(done));
        }
    }

    let document = stack.pop()?;
    document.children.into_iter().find_map(|node| match node {
        Node::Element(e) => Some(e),
        Node::Text(_) => None,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Field mapping
// ────────────────────────────────────────────────────────────────────────────

/// Maps an isolated root-tag region to a Document.
pub fn map_tags(region: &str, fields: &FieldNames) -> Result<Document, ExtractError> {
    let root = parse_tree(region).ok_or_else(|| ExtractError::MalformedPayload {
        reason: "root tag region contains no element".to_string(),
    })?;

    // Direct children only: a slide's <Title> must never become the deck title.
    let title = root
        .child(&fields.title)
        .map(|e| normalize_text(&e.text()))
        .filter(|t| !t.is_empty())
        .ok_or(ExtractError::MissingRequiredField { field: "title" })?;
    let subtitle = root
        .child(&fields.subtitle)
        .map(|e| normalize_text(&e.text()))
        .ok_or(ExtractError::MissingRequiredField { field: "subtitle" })?;

    let mut blocks = Vec::new();
    root.outermost(&fields.section, &mut blocks);
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

fn map_section(index: usize, block: &Element, fields: &FieldNames) -> Option<Section> {
    let title = block.child(&fields.title).map(Element::text);

    // `<Concept>` may wrap both a `<Paragraph>` and the bullet list.
    let list_names: Vec<String> = fields.bullets.iter().chain(&fields.bullet).cloned().collect();
    let paragraph = block.child(&fields.paragraph).map(|outer| {
        outer
            .child(&fields.paragraph)
            .unwrap_or(outer)
            .text_excluding(&list_names)
    });

    let mut items = Vec::new();
    block.outermost(&fields.bullet, &mut items);
    let mut bullets: Vec<String> = items.iter().map(|e| e.text()).collect();

    // A bullet container with plain lines and no bullet elements inside.
    if bullets.is_empty() {
        let mut containers = Vec::new();
        block.outermost(&fields.bullets, &mut containers);
        bullets = containers
            .iter()
            .flat_map(|c| split_bullet_lines(&c.text()))
            .collect();
    }

    assemble_section(index, title, paragraph, bullets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_open_close_and_text() {
        let tokens = tokenize("<Slide a=\"1\">Hi &amp; bye</SLIDE><br/>");
        assert!(matches!(
            &tokens[0],
            Token::Open { name, self_closing: false, .. } if name == "slide"
        ));
        assert_eq!(tokens[1], Token::Text("Hi & bye".to_string()));
        assert!(matches!(&tokens[2], Token::Close { name, .. } if name == "slide"));
        assert!(matches!(
            &tokens[3],
            Token::Open { name, self_closing: true, .. } if name == "br"
        ));
    }

    #[test]
    fn test_tokenize_skips_comments_and_keeps_cdata() {
        let tokens = tokenize("<?xml version=\"1.0\"?><!-- <Slide> --><T><![CDATA[a < b]]></T>");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::Text("a < b".to_string()));
    }

    #[test]
    fn test_less_than_in_prose_is_text() {
        let tokens = tokenize("P(x) < 5 and 3 <4");
        assert_eq!(tokens, vec![Token::Text("P(x) < 5 and 3 <4".to_string())]);
    }

    #[test]
    fn test_spaced_less_than_with_letter_operands_is_text() {
        let tokens = tokenize("holds when a < b and x < y and y > z");
        assert_eq!(
            tokens,
            vec![Token::Text("holds when a < b and x < y and y > z".to_string())]
        );
    }

    #[test]
    fn test_less_than_never_swallows_following_tags() {
        let tokens = tokenize("a <b c</Bullet>");
        assert_eq!(tokens[0], Token::Text("a <b c".to_string()));
        assert!(matches!(&tokens[1], Token::Close { name, .. } if name == "bullet"));
    }

    #[test]
    fn test_map_tags_keeps_bullets_with_comparisons() {
        let names = FieldNames::default();
        let region = "<PowerPoint><Title>Order</Title><Subtitle>S</Subtitle><Slide><Title>Rules</Title>\
                      <BulletPoint>holds when a < b</BulletPoint>\
                      <BulletPoint>second bullet</BulletPoint>\
                      <BulletPoint>if x < y and y > z then</BulletPoint>\
                      <BulletPoint>third</BulletPoint></Slide></PowerPoint>";
        let doc = map_tags(region, &names).expect("document");
        assert_eq!(
            doc.sections[0].bullets,
            vec![
                "holds when a < b",
                "second bullet",
                "if x < y and y > z then",
                "third"
            ]
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &quot;c&quot;"), "a <b> \"c\"");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("&unknown; &"), "&unknown; &");
    }

    #[test]
    fn test_parse_tree_closes_unclosed_children() {
        let root = parse_tree("<Slide><Title>A<BulletPoint>x</BulletPoint></Slide>").expect("tree");
        assert_eq!(root.name, "slide");
        assert_eq!(root.text(), "Ax");
    }

    #[test]
    fn test_parse_tree_ignores_stray_close() {
        let root = parse_tree("<Deck></Title><Title>T</Title></Deck>").expect("tree");
        let names = FieldNames::default();
        assert_eq!(root.child(&names.title).map(Element::text).as_deref(), Some("T"));
    }

    #[test]
    fn test_map_tags_direct_children_only() {
        let names = FieldNames::default();
        let region = "<PowerPoint><Slide><Title>Slide title</Title><BulletPoint>b</BulletPoint></Slide>\
                      <Subtitle>Sub</Subtitle></PowerPoint>";
        let err = map_tags(region, &names).unwrap_err();
        assert_eq!(err, ExtractError::MissingRequiredField { field: "title" });
    }

    #[test]
    fn test_map_tags_concept_wrapping_paragraph_and_bullets() {
        let names = FieldNames::default();
        let region = "<presentation><title>ETFs</title><subtitle>Models</subtitle><slides>\
                      <slide><title>Deterministic</title><concept>\
                      <paragraph>Static return assumptions</paragraph>\
                      <bullets><bullet>Constant rates</bullet><bullet>Fixed inputs:</bullet>\
                      <sub-bullets><bullet>$2,000 monthly</bullet></sub-bullets></bullets>\
                      </concept></slide>\
                      <slide><title>Intro</title><concept><bullets><bullet>Overview</bullet></bullets></concept></slide>\
                      </slides></presentation>";
        let doc = map_tags(region, &names).expect("document");
        assert_eq!(doc.sections.len(), 2);
        let first = &doc.sections[0];
        assert_eq!(first.paragraph.as_deref(), Some("Static return assumptions"));
        assert_eq!(first.bullets, vec!["Constant rates", "Fixed inputs:", "$2,000 monthly"]);
        assert_eq!(doc.sections[1].paragraph, None);
        assert_eq!(doc.sections[1].bullets, vec!["Overview"]);
    }

    #[test]
    fn test_map_tags_sections_in_container() {
        let names = FieldNames::default();
        let region = "<Deck><Title>T</Title><Subtitle/><Slides>\
                      <Slide><Title>One</Title><Concept>Intro  text</Concept></Slide>\
                      <Slide><Title>Two</Title><Bullets>- a\n- b\n\n</Bullets></Slide>\
                      </Slides></Deck>";
        let doc = map_tags(region, &names).expect("document");
        assert_eq!(doc.subtitle, "");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].paragraph.as_deref(), Some("Intro text"));
        assert_eq!(doc.sections[1].bullets, vec!["a", "b"]);
    }
}
