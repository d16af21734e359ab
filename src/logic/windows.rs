use super::evaluator::evaluate_series;
use crate::models::{Category, HourEvaluation, HourPoint, OperationalWindow, Thresholds};

/// Maximum number of hour briefs kept per window
const WINDOW_REASONS: usize = 3;

/// Minimum run length in whole hours: floored, at least one.
/// Non-finite input is treated as one hour.
pub fn min_run_hours(min_window_hours: f64) -> usize {
    if !min_window_hours.is_finite() {
        return 1;
    }
    min_window_hours.floor().max(1.0) as usize
}

/// Detect operational windows in a series.
///
/// `offset` is added to every reported index so a caller can pass a suffix
/// slice and still address the windows against the full series.
pub fn compute_operational_windows(
    points: &[HourPoint],
    thresholds: Option<&Thresholds>,
    min_window_hours: f64,
    offset: usize,
) -> Vec<OperationalWindow> {
    let evaluations = evaluate_series(points, thresholds);
    windows_from_evaluations(points, &evaluations, min_window_hours, offset)
}

/// Window detection over already evaluated hours. Single left-to-right pass.
pub fn windows_from_evaluations(
    points: &[HourPoint],
    evaluations: &[HourEvaluation],
    min_window_hours: f64,
    offset: usize,
) -> Vec<OperationalWindow> {
    let min_len = min_run_hours(min_window_hours);
    let n = points.len().min(evaluations.len());
    let mut windows = Vec::new();
    let mut cursor = 0;

    while cursor < n {
        if !evaluations[cursor].category.is_workable() {
            cursor += 1;
            continue;
        }

        let start = cursor;
        let mut score_sum = 0i64;
        let mut reasons: Vec<String> = Vec::new();
        while cursor < n && evaluations[cursor].category.is_workable() {
            let eval = &evaluations[cursor];
            score_sum += eval.score as i64;
            if reasons.len() < WINDOW_REASONS && !eval.brief.is_empty() {
                reasons.push(eval.brief.clone());
            }
            cursor += 1;
        }
        let end = cursor - 1;
        let len = cursor - start;

        if len >= min_len {
            let average_score = score_sum as f64 / len as f64;
            let status = if average_score >= 85.0 {
                Category::Buona
            } else {
                Category::Discreta
            };
            windows.push(OperationalWindow {
                start_index: start + offset,
                end_index: end + offset,
                start_ts: points[start].ts.clone(),
                end_ts: points[end].ts.clone(),
                status,
                confidence: average_score.round() as i32,
                average_score,
                reasons,
            });
        }

        // Skip the breaking hour, already known to be Scarsa
        cursor += 1;
    }

    windows
}
