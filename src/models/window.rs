use super::evaluation::Category;
use super::hour::fmt_hh_mm;
use serde::{Deserialize, Serialize};

/// A maximal run of workable hours that met the minimum duration.
///
/// Indices are absolute against the series the caller evaluated,
/// `end_index` inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalWindow {
    pub start_index: usize,
    pub end_index: usize,
    pub start_ts: String,
    pub end_ts: String,
    pub status: Category,
    pub confidence: i32,
    pub average_score: f64,
    /// Up to three non-empty hour briefs, in run order
    pub reasons: Vec<String>,
}

impl OperationalWindow {
    pub fn hours(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Representative explanation: the first non-empty brief in the run
    pub fn reason(&self) -> &str {
        self.reasons.first().map(String::as_str).unwrap_or("")
    }

    /// `HH:MM-HH:MM`
    pub fn time_label(&self) -> String {
        format!("{}-{}", fmt_hh_mm(&self.start_ts), fmt_hh_mm(&self.end_ts))
    }
}
