//! Page budget — the geometric and typographic constraints every fragment must satisfy.

use serde::{Deserialize, Serialize};

use crate::layout::text_metrics::TextMetrics;

/// Content-box constraints for a single slide body.
///
/// Defaults assume a 10" × 7.5" slide with a 9" × 5" body placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBudget {
    /// Paragraph box width, inches.
    pub box_width: f32,
    /// Bullet box width, inches. Narrower than `box_width` by the bullet indent.
    pub bullet_box_width: f32,
    /// Usable body height, inches.
    pub max_content_height: f32,
    /// Candidate sizes in points, tried from largest to smallest.
    pub font_size_candidates: Vec<u16>,
    /// Floor: overflow below this size is resolved by pagination, never by shrinking.
    pub min_font_size: u16,
    /// Gap between the paragraph and the first bullet, inches.
    pub block_spacing: f32,
    /// Gap between consecutive bullets, inches.
    pub bullet_spacing: f32,
}

impl Default for PageBudget {
    fn default() -> Self {
        Self {
            box_width: 9.0,
            bullet_box_width: 8.5,
            max_content_height: 5.0,
            font_size_candidates: vec![28, 24, 20, 18, 16],
            min_font_size: 14,
            block_spacing: 0.2,
            bullet_spacing: 0.1,
        }
    }
}

impl PageBudget {
    /// Rejects budgets that cannot hold any text.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.box_width > 0.0) {
            return Err(format!("box width must be positive, got {}", self.box_width));
        }
        if !(self.bullet_box_width > 0.0) {
            return Err(format!(
                "bullet box width must be positive, got {}",
                self.bullet_box_width
            ));
        }
        if !(self.max_content_height > 0.0) {
            return Err(format!(
                "content height must be positive, got {}",
                self.max_content_height
            ));
        }
        if self.min_font_size == 0 {
            return Err("minimum font size must be at least 1pt".to_string());
        }
        if self.block_spacing < 0.0 || self.bullet_spacing < 0.0 {
            return Err("spacing constants must not be negative".to_string());
        }
        Ok(())
    }

    /// Candidate sizes at or above the floor, largest first, without duplicates.
    pub fn usable_font_sizes(&self) -> Vec<u16> {
        let mut sizes: Vec<u16> = self
            .font_size_candidates
            .iter()
            .copied()
            .filter(|&s| s >= self.min_font_size)
            .collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes.dedup();
        sizes
    }
}

/// Combines a metrics strategy with a budget to estimate block heights.
#[derive(Clone, Copy)]
pub struct HeightEstimator<'a> {
    metrics: &'a dyn TextMetrics,
    budget: &'a PageBudget,
}

impl<'a> HeightEstimator<'a> {
    pub fn new(metrics: &'a dyn TextMetrics, budget: &'a PageBudget) -> Self {
        Self { metrics, budget }
    }

    pub fn budget(&self) -> &'a PageBudget {
        self.budget
    }

    pub fn paragraph_height(&self, paragraph: &str, font_size: u16) -> f32 {
        self.metrics
            .estimate_height(paragraph, font_size, self.budget.box_width)
    }

    pub fn bullet_height(&self, bullet: &str, font_size: u16) -> f32 {
        self.metrics
            .estimate_height(bullet, font_size, self.budget.bullet_box_width)
    }

    /// Total height of a paragraph followed by a bullet list.
    ///
    /// Inter-block spacing is added only when both blocks are present; inter-bullet
    /// spacing is added between consecutive bullets. A whitespace-only paragraph
    /// counts as absent.
    pub fn estimate_total_height<S: AsRef<str>>(
        &self,
        paragraph: Option<&str>,
        bullets: &[S],
        font_size: u16,
    ) -> f32 {
        let paragraph = paragraph.filter(|p| !p.trim().is_empty());
        let mut total = 0.0_f32;

        if let Some(p) = paragraph {
            total += self.paragraph_height(p, font_size);
            if !bullets.is_empty() {
                total += self.budget.block_spacing;
            }
        }

        for (i, bullet) in bullets.iter().enumerate() {
            if i > 0 {
                total += self.budget.bullet_spacing;
            }
            total += self.bullet_height(bullet.as_ref(), font_size);
        }
        total
    }

    pub fn fits<S: AsRef<str>>(&self, paragraph: Option<&str>, bullets: &[S], font_size: u16) -> bool {
        self.estimate_total_height(paragraph, bullets, font_size) <= self.budget.max_content_height
    }
}
