//! Text height estimation for slide bodies.
//!
//! There is no layout engine behind this: heights are approximated from text length,
//! font size, and box width. `FlowEngine` only ever sees the `TextMetrics` trait, so a
//! glyph-measuring implementation can replace the heuristics without touching pagination.
//!
//! All linear quantities are inches. Font sizes are points (1/72 inch).

use serde::{Deserialize, Serialize};

pub const POINTS_PER_INCH: f32 = 72.0;
/// Baseline-to-baseline distance as a multiple of the font size.
pub const LINE_SPACING: f32 = 1.2;
pub const DEFAULT_CHAR_WIDTH_RATIO: f32 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Strategy trait
// ────────────────────────────────────────────────────────────────────────────

/// Height estimation strategy.
///
/// Implementations must be deterministic and monotonic: a larger `font_size` never
/// lowers the estimate, a wider `box_width` never raises it.
pub trait TextMetrics: Send + Sync {
    /// Number of printed lines `text` occupies when word-wrapped into `box_width`.
    /// Empty or whitespace-only text occupies zero lines.
    fn wrapped_lines(&self, text: &str, font_size: u16, box_width: f32) -> usize;

    /// Height of one printed line, in inches.
    fn line_height(&self, font_size: u16) -> f32 {
        f32::from(font_size) * LINE_SPACING / POINTS_PER_INCH
    }

    /// Estimated rendered height of `text`, in inches.
    fn estimate_height(&self, text: &str, font_size: u16, box_width: f32) -> f32 {
        self.wrapped_lines(text, font_size, box_width) as f32 * self.line_height(font_size)
    }
}

/// Which built-in strategy to use. Parsed from `DECK_METRICS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsKind {
    Average,
    Glyph,
}

impl std::str::FromStr for MetricsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "average" => Ok(MetricsKind::Average),
            "glyph" => Ok(MetricsKind::Glyph),
            other => Err(format!("unknown metrics kind '{other}' (expected average|glyph)")),
        }
    }
}

/// Returns a boxed instance of the requested strategy.
pub fn metrics_for(kind: MetricsKind) -> Box<dyn TextMetrics> {
    match kind {
        MetricsKind::Average => Box::new(AverageWidthMetrics::default()),
        MetricsKind::Glyph => Box::new(GlyphTableMetrics),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Average character width
// ────────────────────────────────────────────────────────────────────────────

/// Treats every character as `char_width_ratio` em wide.
#[derive(Debug, Clone, Copy)]
pub struct AverageWidthMetrics {
    pub char_width_ratio: f32,
}

impl Default for AverageWidthMetrics {
    fn default() -> Self {
        Self {
            char_width_ratio: DEFAULT_CHAR_WIDTH_RATIO,
        }
    }
}

impl AverageWidthMetrics {
    /// Characters that fit on one line. Never less than 1.
    pub fn chars_per_line(&self, font_size: u16, box_width: f32) -> usize {
        let char_width_pt = f32::from(font_size.max(1)) * self.char_width_ratio;
        let per_line = (box_width * POINTS_PER_INCH / char_width_pt).floor();
        if per_line.is_finite() && per_line >= 1.0 {
            per_line as usize
        } else {
            1
        }
    }
}

impl TextMetrics for AverageWidthMetrics {
    /// Greedy word wrap over character counts. A word longer than a line still
    /// occupies exactly one line.
    fn wrapped_lines(&self, text: &str, font_size: u16, box_width: f32) -> usize {
        let max_chars = self.chars_per_line(font_size, box_width);
        let mut lines = 0usize;
        let mut current = 0usize;

        for word in text.split_whitespace() {
            let len = word.chars().count();
            if lines == 0 {
                lines = 1;
                current = len;
            } else if current + 1 + len > max_chars {
                lines += 1;
                current = len;
            } else {
                current += 1 + len;
            }
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-glyph width table
// ────────────────────────────────────────────────────────────────────────────

/// Static em-width table for a proportional sans face, the shape of the default
/// body font in most slide templates.
///
/// `SANS_WIDTHS[i]` is the width of ASCII character `(i + 32)`, 0x20 through 0x7E.
#[rustfmt::skip]
static SANS_WIDTHS: [f32; 95] = [
    // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
    0.23, 0.26, 0.40, 0.50, 0.51, 0.72, 0.68, 0.22, 0.30, 0.30, 0.50, 0.50, 0.25, 0.31, 0.25, 0.39,
    // 0     1     2     3     4     5     6     7     8     9
    0.51, 0.51, 0.51, 0.51, 0.51, 0.51, 0.51, 0.51, 0.51, 0.51,
    // :     ;     <     =     >     ?     @
    0.27, 0.27, 0.50, 0.50, 0.50, 0.46, 0.90,
    // A     B     C     D     E     F     G     H     I     J     K     L     M
    0.58, 0.54, 0.53, 0.62, 0.49, 0.46, 0.63, 0.62, 0.25, 0.32, 0.52, 0.42, 0.85,
    // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
    0.65, 0.66, 0.52, 0.67, 0.54, 0.46, 0.50, 0.64, 0.57, 0.89, 0.52, 0.49, 0.47,
    // [     \     ]     ^     _     `
    0.31, 0.39, 0.31, 0.50, 0.50, 0.29,
    // a     b     c     d     e     f     g     h     i     j     k     l     m
    0.48, 0.53, 0.42, 0.53, 0.50, 0.31, 0.47, 0.53, 0.23, 0.24, 0.46, 0.23, 0.80,
    // n     o     p     q     r     s     t     u     v     w     x     y     z
    0.53, 0.53, 0.53, 0.53, 0.35, 0.39, 0.33, 0.53, 0.45, 0.72, 0.43, 0.45, 0.40,
    // {     |     }     ~
    0.31, 0.46, 0.31, 0.50,
];

const SANS_SPACE_WIDTH: f32 = 0.23;
/// Fallback for codepoints outside the table.
const SANS_AVERAGE_WIDTH: f32 = 0.50;

/// Measures each word with `SANS_WIDTHS` and wraps greedily on measured width.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphTableMetrics;

impl GlyphTableMetrics {
    /// Width of `s` in em units. Non-ASCII characters use the average width.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    SANS_WIDTHS[code - 32]
                } else {
                    SANS_AVERAGE_WIDTH
                }
            })
            .sum()
    }
}

impl TextMetrics for GlyphTableMetrics {
    fn wrapped_lines(&self, text: &str, font_size: u16, box_width: f32) -> usize {
        // Work in em units so the font size only scales the available width.
        let max_em = box_width * POINTS_PER_INCH / f32::from(font_size.max(1));
        let mut lines = 0usize;
        let mut current = 0.0_f32;

        for word in text.split_whitespace() {
            let word_em = self.measure_em(word);
            if lines == 0 {
                lines = 1;
                current = word_em;
            } else if current + SANS_SPACE_WIDTH + word_em > max_em {
                lines += 1;
                current = word_em;
            } else {
                current += SANS_SPACE_WIDTH + word_em;
            }
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
