use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::layout::{MetricsKind, PageBudget};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is set but cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional: without it `/api/v1/decks/generate` answers 503.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub box_width_in: f32,
    pub bullet_indent_in: f32,
    pub box_height_in: f32,
    pub font_sizes: Vec<u16>,
    pub min_font_size: u16,
    pub block_spacing_in: f32,
    pub bullet_spacing_in: f32,
    pub metrics: MetricsKind,
    /// Overrides the accepted root wrapper names (`DECK_ROOT_TAGS=Deck,Report`).
    pub root_tags: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            box_width_in: 9.0,
            bullet_indent_in: 0.5,
            box_height_in: 5.0,
            font_sizes: vec![28, 24, 20, 18, 16],
            min_font_size: 14,
            block_spacing_in: 0.2,
            bullet_spacing_in: 0.1,
            metrics: MetricsKind::Average,
            root_tags: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source. Unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let parsed = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            anthropic_api_key: parsed("ANTHROPIC_API_KEY"),
            port: parse_or("PORT", parsed("PORT"), defaults.port)?,
            rust_log: parsed("RUST_LOG").unwrap_or(defaults.rust_log),
            box_width_in: parse_or(
                "DECK_BOX_WIDTH_IN",
                parsed("DECK_BOX_WIDTH_IN"),
                defaults.box_width_in,
            )?,
            bullet_indent_in: parse_or(
                "DECK_BULLET_INDENT_IN",
                parsed("DECK_BULLET_INDENT_IN"),
                defaults.bullet_indent_in,
            )?,
            box_height_in: parse_or(
                "DECK_BOX_HEIGHT_IN",
                parsed("DECK_BOX_HEIGHT_IN"),
                defaults.box_height_in,
            )?,
            font_sizes: match parsed("DECK_FONT_SIZES") {
                Some(raw) => parse_list("DECK_FONT_SIZES", &raw)?,
                None => defaults.font_sizes,
            },
            min_font_size: parse_or(
                "DECK_MIN_FONT_SIZE",
                parsed("DECK_MIN_FONT_SIZE"),
                defaults.min_font_size,
            )?,
            block_spacing_in: parse_or(
                "DECK_BLOCK_SPACING_IN",
                parsed("DECK_BLOCK_SPACING_IN"),
                defaults.block_spacing_in,
            )?,
            bullet_spacing_in: parse_or(
                "DECK_BULLET_SPACING_IN",
                parsed("DECK_BULLET_SPACING_IN"),
                defaults.bullet_spacing_in,
            )?,
            metrics: match parsed("DECK_METRICS") {
                Some(raw) => raw
                    .parse::<MetricsKind>()
                    .map_err(|e| anyhow!(e))
                    .context("DECK_METRICS must be 'average' or 'glyph'")?,
                None => defaults.metrics,
            },
            root_tags: parsed("DECK_ROOT_TAGS").map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
        })
    }

    /// Builds and validates the page budget from the layout settings.
    pub fn page_budget(&self) -> Result<PageBudget> {
        let budget = PageBudget {
            box_width: self.box_width_in,
            bullet_box_width: self.box_width_in - self.bullet_indent_in,
            max_content_height: self.box_height_in,
            font_size_candidates: self.font_sizes.clone(),
            min_font_size: self.min_font_size,
            block_spacing: self.block_spacing_in,
            bullet_spacing: self.bullet_spacing_in,
        };
        budget
            .validate()
            .map_err(|e| anyhow!(e))
            .context("Invalid DECK_* layout settings")?;
        Ok(budget)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn parse_list(key: &str, raw: &str) -> Result<Vec<u16>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u16>()
                .with_context(|| format!("{key} must be a comma-separated list of point sizes, got '{s}'"))
        })
        .collect()
}
