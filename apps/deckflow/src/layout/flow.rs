//! Flow & pagination — partitions each section into page-sized fragments.
//!
//! # Algorithm
//! 1. Font selection: the largest candidate size at which the whole section fits the
//!    budget, else the floor size.
//! 2. Greedy fill at that size: paragraph first (split at a word boundary when it is
//!    taller than a page), then as many whole bullets as fit.
//!
//! Fragments borrow from the section. Concatenating the paragraph slices of all
//! fragments yields the original paragraph byte-for-byte, and concatenating the bullet
//! slices yields the original bullet list.

use serde::Serialize;
use tracing::debug;

use crate::layout::budget::{HeightEstimator, PageBudget};
use crate::layout::text_metrics::TextMetrics;
use crate::models::document::{Document, Section};

// ────────────────────────────────────────────────────────────────────────────
// Output type
// ────────────────────────────────────────────────────────────────────────────

/// One page's worth of a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment<'a> {
    pub source_section_index: usize,
    pub section_title: &'a str,
    /// Contiguous slice of the section paragraph. A slice that ends at a split point
    /// keeps its trailing separator so that concatenation is lossless.
    pub paragraph: Option<&'a str>,
    /// Contiguous run of the section's bullets.
    pub bullets: &'a [String],
    pub is_continuation: bool,
    pub chosen_font_size: u16,
    /// A single word or bullet on this page is taller than the budget on its own.
    pub may_overflow: bool,
}

impl<'a> Fragment<'a> {
    /// Paragraph text as it should be drawn (separator whitespace removed).
    pub fn display_paragraph(&self) -> Option<&'a str> {
        self.paragraph.map(str::trim).filter(|p| !p.is_empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Stateless pagination over a metrics strategy and a page budget.
#[derive(Clone, Copy)]
pub struct FlowEngine<'a> {
    estimator: HeightEstimator<'a>,
}

impl<'a> FlowEngine<'a> {
    pub fn new(metrics: &'a dyn TextMetrics, budget: &'a PageBudget) -> Self {
        Self {
            estimator: HeightEstimator::new(metrics, budget),
        }
    }

    pub fn estimator(&self) -> HeightEstimator<'a> {
        self.estimator
    }

    fn budget(&self) -> &'a PageBudget {
        self.estimator.budget()
    }

    /// Largest candidate at which the whole section fits on one page.
    pub fn select_font_size(&self, section: &Section) -> u16 {
        let budget = self.budget();
        let paragraph = section.paragraph.as_deref();

        for size in budget.usable_font_sizes() {
            if self.estimator.fits(paragraph, &section.bullets, size) {
                return size;
            }
        }
        debug!(
            section = %section.title,
            min_font_size = budget.min_font_size,
            "Section does not fit at any candidate size; paginating at the floor"
        );
        budget.min_font_size
    }

    /// Flows every section of the document, in order.
    pub fn flow_document<'d>(&self, document: &'d Document) -> Vec<Fragment<'d>> {
        document
            .sections
            .iter()
            .enumerate()
            .flat_map(|(index, section)| self.flow_section(index, section))
            .collect()
    }

    /// Greedy pagination of one section at the selected font size.
    ///
    /// The section must have content; extraction filters empty sections out.
    pub fn flow_section<'d>(&self, index: usize, section: &'d Section) -> Vec<Fragment<'d>> {
        debug_assert!(
            section.has_content(),
            "empty section reached the flow engine"
        );

        let font_size = self.select_font_size(section);
        let max_height = self.budget().max_content_height;
        let bullets = section.bullets.as_slice();

        let mut pending: Option<&'d str> = section
            .paragraph
            .as_deref()
            .filter(|p| !p.trim().is_empty());
        let mut next_bullet = 0usize;
        let mut fragments: Vec<Fragment<'d>> = Vec::new();

        while pending.is_some() || next_bullet < bullets.len() {
            let mut paragraph: Option<&'d str> = None;
            let mut may_overflow = false;

            if let Some(text) = pending.take() {
                if self.estimator.paragraph_height(text, font_size) <= max_height {
                    paragraph = Some(text);
                } else {
                    let (head, tail) = self.split_paragraph(text, font_size);
                    if self.estimator.paragraph_height(head, font_size) > max_height {
                        // A single word taller than the page: placed alone.
                        may_overflow = true;
                    }
                    paragraph = Some(head);
                    pending = tail;
                }
            }

            let start = next_bullet;
            if pending.is_none() {
                while next_bullet < bullets.len() {
                    let candidate = &bullets[start..=next_bullet];
                    if self.estimator.fits(paragraph, candidate, font_size) {
                        next_bullet += 1;
                    } else if paragraph.is_none() && next_bullet == start {
                        // Bullets are never split: an oversized bullet gets its own page.
                        next_bullet += 1;
                        may_overflow = true;
                        break;
                    } else {
                        break;
                    }
                }
            }

            fragments.push(Fragment {
                source_section_index: index,
                section_title: &section.title,
                paragraph,
                bullets: &bullets[start..next_bullet],
                is_continuation: !fragments.is_empty(),
                chosen_font_size: font_size,
                may_overflow,
            });
        }

        debug!(
            section = %section.title,
            font_size,
            fragments = fragments.len(),
            "Section flowed"
        );
        fragments
    }

    /// Splits `text` after the longest word-aligned prefix that fits the page.
    ///
    /// The head always holds at least one word and keeps the whitespace that follows
    /// it; the tail (if any) starts at the next word.
    fn split_paragraph<'t>(&self, text: &'t str, font_size: u16) -> (&'t str, Option<&'t str>) {
        let starts = word_starts(text);
        if starts.len() <= 1 {
            return (text, None);
        }

        let max_height = self.budget().max_content_height;
        let prefix = |words: usize| -> &'t str {
            if words >= starts.len() {
                text
            } else {
                &text[..starts[words]]
            }
        };

        // Line count is monotonic in the number of words, so binary search applies.
        let (mut lo, mut hi) = (1usize, starts.len());
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if self.estimator.paragraph_height(prefix(mid), font_size) <= max_height {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        if lo >= starts.len() {
            (text, None)
        } else {
            (&text[..starts[lo]], Some(&text[starts[lo]..]))
        }
    }
}

/// Byte offsets at which each whitespace-separated word begins.
fn word_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut in_word = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            starts.push(i);
            in_word = true;
        }
    }
    starts
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
