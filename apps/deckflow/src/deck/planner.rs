//! Deck planning — lays a Document out into title data plus body pages.

use tracing::{debug, warn};

use crate::layout::{analyze_fragments, FlowEngine, Fragment, PageFill, PageFillVerdict};
use crate::models::document::Document;

/// One body page: the fragment to draw and how full it is.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage<'a> {
    pub fragment: Fragment<'a>,
    pub fill: PageFill,
}

/// Everything a renderer needs, borrowed from the Document.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckPlan<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub pages: Vec<PlannedPage<'a>>,
}

impl DeckPlan<'_> {
    pub fn overflow_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.fill.verdict == PageFillVerdict::Overflow)
            .count()
    }
}

/// Flows every section and attaches fill analysis to each page.
pub fn plan_deck<'a>(document: &'a Document, engine: &FlowEngine<'_>) -> DeckPlan<'a> {
    let fragments = engine.flow_document(document);
    let fills = analyze_fragments(&fragments, &engine.estimator());

    let pages: Vec<PlannedPage<'a>> = fragments
        .into_iter()
        .zip(fills)
        .map(|(fragment, fill)| PlannedPage { fragment, fill })
        .collect();

    for (number, page) in pages.iter().enumerate() {
        if page.fill.verdict == PageFillVerdict::Overflow {
            warn!(
                page = number + 1,
                section = %page.fragment.section_title,
                fill_ratio = page.fill.fill_ratio,
                "Page content exceeds the body box"
            );
        }
    }

    let plan = DeckPlan {
        title: &document.title,
        subtitle: &document.subtitle,
        pages,
    };
    debug!(
        sections = document.sections.len(),
        pages = plan.pages.len(),
        overflow = plan.overflow_pages(),
        "Deck planned"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::text_metrics::AverageWidthMetrics;
    use crate::layout::PageBudget;
    use crate::models::document::Section;

    fn document() -> Document {
        Document {
            title: "Portfolio Estimation".to_string(),
            subtitle: "Deterministic | Monte Carlo".to_string(),
            sections: vec![
                Section {
                    title: "Introduction".to_string(),
                    paragraph: Some("Methods for estimating ETF portfolio value.".to_string()),
                    bullets: vec!["Deterministic models".to_string()],
                },
                Section {
                    title: "Long read".to_string(),
                    paragraph: Some(vec!["word"; 400].join(" ")),
                    bullets: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_plan_covers_every_section_in_order() {
        let metrics = AverageWidthMetrics::default();
        let budget = PageBudget::default();
        let engine = FlowEngine::new(&metrics, &budget);
        let doc = document();

        let plan = plan_deck(&doc, &engine);
        assert_eq!(plan.title, "Portfolio Estimation");
        assert_eq!(plan.subtitle, "Deterministic | Monte Carlo");
        assert!(plan.pages.len() >= 3);
        assert_eq!(plan.pages[0].fragment.source_section_index, 0);
        assert!(!plan.pages[1].fragment.is_continuation);
        assert!(plan.pages[2].fragment.is_continuation);
        assert_eq!(plan.overflow_pages(), 0);
    }

    #[test]
    fn test_plan_reports_overflow() {
        let metrics = AverageWidthMetrics::default();
        let budget = PageBudget {
            max_content_height: 0.5,
            ..PageBudget::default()
        };
        let engine = FlowEngine::new(&metrics, &budget);
        let doc = Document {
            title: "T".to_string(),
            subtitle: String::new(),
            sections: vec![Section {
                title: "Dense".to_string(),
                paragraph: None,
                bullets: vec![vec!["token"; 80].join(" ")],
            }],
        };
        let plan = plan_deck(&doc, &engine);
        assert_eq!(plan.pages.len(), 1);
        assert!(plan.pages[0].fragment.may_overflow);
        assert_eq!(plan.overflow_pages(), 1);
    }

    #[test]
    fn test_plan_empty_document() {
        let metrics = AverageWidthMetrics::default();
        let budget = PageBudget::default();
        let engine = FlowEngine::new(&metrics, &budget);
        let doc = Document {
            title: "T".to_string(),
            subtitle: String::new(),
            sections: Vec::new(),
        };
        assert!(plan_deck(&doc, &engine).pages.is_empty());
    }
}
