//! Page Fill Analysis — how much of the slide body each fragment uses.
//!
//! Pagination already guarantees the budget for non-degenerate input; this module reports
//! the result so renderers and logs can spot overflowing or nearly-empty pages.
//!
//! # Fill rules
//! - fill > 100%                                  → Overflow (oversized word or bullet)
//! - fill < 30% on a split section, not its last page → Sparse
//! - otherwise                                    → Acceptable

use serde::{Deserialize, Serialize};

use crate::layout::budget::HeightEstimator;
use crate::layout::flow::Fragment;

const SPARSE_FILL: f32 = 0.30;

/// Overall fill verdict for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFillVerdict {
    Acceptable,
    /// A continued section left most of this page empty.
    Sparse,
    /// Estimated content is taller than the body box.
    Overflow,
}

/// Fill analysis for one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFill {
    pub used_height: f32,
    pub available_height: f32,
    pub fill_ratio: f32,
    pub verdict: PageFillVerdict,
}

/// Analyzes one fragment. `is_last_of_section` exempts the tail page of a split
/// section from the sparse check.
pub fn analyze_fragment_fill(
    fragment: &Fragment<'_>,
    is_last_of_section: bool,
    estimator: &HeightEstimator<'_>,
) -> PageFill {
    let used_height = estimator.estimate_total_height(
        fragment.paragraph,
        fragment.bullets,
        fragment.chosen_font_size,
    );
    let available_height = estimator.budget().max_content_height;
    let fill_ratio = used_height / available_height;

    // A non-final page always belongs to a split section.
    let verdict = if fill_ratio > 1.0 {
        PageFillVerdict::Overflow
    } else if !is_last_of_section && fill_ratio < SPARSE_FILL {
        PageFillVerdict::Sparse
    } else {
        PageFillVerdict::Acceptable
    };

    PageFill {
        used_height,
        available_height,
        fill_ratio,
        verdict,
    }
}

/// Analyzes a fragment sequence, marking each section's final fragment.
pub fn analyze_fragments(fragments: &[Fragment<'_>], estimator: &HeightEstimator<'_>) -> Vec<PageFill> {
    fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| {
            let is_last_of_section = fragments
                .get(i + 1)
                .map_or(true, |next| !next.is_continuation);
            analyze_fragment_fill(fragment, is_last_of_section, estimator)
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::budget::PageBudget;
    use crate::layout::text_metrics::AverageWidthMetrics;

    fn budget() -> PageBudget {
        PageBudget {
            box_width: 7.0,
            bullet_box_width: 7.0,
            max_content_height: 1.3,
            font_size_candidates: vec![20],
            min_font_size: 20,
            block_spacing: 0.0,
            bullet_spacing: 0.0,
        }
    }

    fn fragment<'a>(bullets: &'a [String], is_continuation: bool) -> Fragment<'a> {
        Fragment {
            source_section_index: 0,
            section_title: "Topic",
            paragraph: None,
            bullets,
            is_continuation,
            chosen_font_size: 20,
            may_overflow: false,
        }
    }

    #[test]
    fn test_full_page_is_acceptable() {
        let metrics = AverageWidthMetrics::default();
        let budget = budget();
        let est = HeightEstimator::new(&metrics, &budget);
        let bullets = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let fill = analyze_fragment_fill(&fragment(&bullets, false), true, &est);
        assert_eq!(fill.verdict, PageFillVerdict::Acceptable);
        assert!(fill.fill_ratio > 0.7 && fill.fill_ratio <= 1.0);
        assert!((fill.available_height - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_overflow_detected() {
        let metrics = AverageWidthMetrics::default();
        let budget = budget();
        let est = HeightEstimator::new(&metrics, &budget);
        let bullets = vec![vec!["word"; 60].join(" ")];
        let fill = analyze_fragment_fill(&fragment(&bullets, false), true, &est);
        assert_eq!(fill.verdict, PageFillVerdict::Overflow);
        assert!(fill.fill_ratio > 1.0);
    }

    #[test]
    fn test_sparse_only_for_non_final_split_pages() {
        let metrics = AverageWidthMetrics::default();
        let budget = budget();
        let est = HeightEstimator::new(&metrics, &budget);
        let one = vec!["a".to_string()];

        // Short standalone slide: fine.
        let fill = analyze_fragment_fill(&fragment(&one, false), true, &est);
        assert_eq!(fill.verdict, PageFillVerdict::Acceptable);

        // Short tail of a split section: fine.
        let fill = analyze_fragment_fill(&fragment(&one, true), true, &est);
        assert_eq!(fill.verdict, PageFillVerdict::Acceptable);

        // Short page followed by a continuation: sparse.
        let fill = analyze_fragment_fill(&fragment(&one, false), false, &est);
        assert_eq!(fill.verdict, PageFillVerdict::Sparse);
    }

    #[test]
    fn test_analyze_fragments_marks_section_ends() {
        let metrics = AverageWidthMetrics::default();
        let budget = budget();
        let est = HeightEstimator::new(&metrics, &budget);
        let one = vec!["a".to_string()];
        let fragments = vec![
            fragment(&one, false),
            fragment(&one, true),
            fragment(&one, false),
        ];
        let fills = analyze_fragments(&fragments, &est);
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0].verdict, PageFillVerdict::Sparse);
        assert_eq!(fills[1].verdict, PageFillVerdict::Acceptable);
        assert_eq!(fills[2].verdict, PageFillVerdict::Acceptable);
    }
}
