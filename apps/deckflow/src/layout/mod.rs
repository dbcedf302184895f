// Flow & pagination: height heuristics, page budgets, greedy section pagination.
// Everything here is synchronous and pure; handlers call it inline.

pub mod budget;
pub mod flow;
pub mod page_fill;
pub mod text_metrics;

// Re-export the public API consumed by other modules (deck planner, handlers, config).
pub use budget::{HeightEstimator, PageBudget};
pub use flow::{FlowEngine, Fragment};
pub use page_fill::{analyze_fragments, PageFill, PageFillVerdict};
pub use text_metrics::{metrics_for, MetricsKind, TextMetrics};
