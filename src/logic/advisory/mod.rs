pub mod conditions;
pub mod drift;
pub mod engine;
pub mod factors;
pub mod product;
pub mod schedule;
pub mod water_stress;

pub use engine::AdvisoryGenerator;

use crate::models::{HourEvaluation, OperationalWindow, ProductPreset, Thresholds, TrendMetrics};

/// Everything the advisory rules may look at. Any part can be missing.
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryContext<'a> {
    pub current: Option<&'a HourEvaluation>,
    pub windows: &'a [OperationalWindow],
    pub metrics: Option<&'a TrendMetrics>,
    pub thresholds: &'a Thresholds,
    pub crop_label: Option<&'a str>,
    pub product: Option<&'a ProductPreset>,
    pub min_window_hours: f64,
}

impl<'a> AdvisoryContext<'a> {
    pub fn new(thresholds: &'a Thresholds) -> Self {
        Self {
            current: None,
            windows: &[],
            metrics: None,
            thresholds,
            crop_label: None,
            product: None,
            min_window_hours: 2.0,
        }
    }

    pub fn with_current(mut self, current: Option<&'a HourEvaluation>) -> Self {
        self.current = current;
        self
    }

    pub fn with_windows(mut self, windows: &'a [OperationalWindow]) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<&'a TrendMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_selection(
        mut self,
        crop_label: Option<&'a str>,
        product: Option<&'a ProductPreset>,
        min_window_hours: f64,
    ) -> Self {
        self.crop_label = crop_label;
        self.product = product;
        self.min_window_hours = min_window_hours;
        self
    }

    /// Highest-confidence window; the earliest wins ties.
    pub fn best_window(&self) -> Option<&'a OperationalWindow> {
        self.windows
            .iter()
            .fold(None, |best: Option<&OperationalWindow>, w| match best {
                Some(b) if b.confidence >= w.confidence => Some(b),
                _ => Some(w),
            })
    }
}

/// One line contributed to the advice.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    Action(String),
    Caution(String),
    ProductSuggestion(String),
}

/// Trait for advisory rules
pub trait AdvisoryRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Findings for this context, in output order. Never fails: a rule whose
    /// inputs are missing returns nothing.
    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<Finding>;
}
