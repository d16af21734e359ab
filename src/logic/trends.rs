//! Rolling dashboard metrics over two adjacent sub-windows of the series.
//!
//! "Near" covers the twelve hours starting at the current hour, "later" the
//! twelve after that. Both are clipped to the series; an empty later window
//! always yields a stable trend.

use std::ops::Range;

use crate::models::{
    Category, HourEvaluation, HourPoint, MetricReading, Trend, TrendMetrics,
};

pub const NEAR_WINDOW_HOURS: usize = 12;
pub const LATER_WINDOW_HOURS: usize = 12;

/// Dead-band on the gust shear comparison, in m/s
pub const SHEAR_DEAD_BAND: f64 = 0.2;
/// Dead-band on the 0-100 metric comparisons, in points
pub const METRIC_DEAD_BAND: f64 = 5.0;

/// Shear above this no longer lowers stability
pub const SHEAR_CAP_MS: f64 = 6.0;
/// Stability points lost per m/s of shear
pub const SHEAR_PENALTY: f64 = 15.0;

/// Cumulative rain at which mitigation is complete
pub const RAIN_SATURATION_MM: f64 = 3.0;

const GOOD_HOURS_WEIGHT: f64 = 0.7;
const WORKABLE_HOURS_WEIGHT: f64 = 0.3;
const DRYNESS_WEIGHT: f64 = 0.6;
const RAIN_WEIGHT: f64 = 0.4;

const NEUTRAL_STABILITY: f64 = 50.0;
const NEUTRAL_DRIFT: f64 = 50.0;
const NEUTRAL_AVAILABILITY: f64 = 0.0;
const NEUTRAL_HUMIDITY: f64 = 50.0;

/// `[start, start + span)` clipped to `len`.
fn sub_window(len: usize, start: usize, span: usize) -> Range<usize> {
    let start = start.min(len);
    start..start.saturating_add(span).min(len)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Average positive gust-minus-wind spread. Hours missing either reading
/// are skipped.
fn average_shear(points: &[HourPoint]) -> Option<f64> {
    mean(points.iter().filter_map(|p| match (p.wind_ms, p.gust_ms) {
        (Some(w), Some(g)) if w.is_finite() && g.is_finite() => Some((g - w).max(0.0)),
        _ => None,
    }))
}

fn stability_from_shear(shear: f64) -> f64 {
    100.0 - shear.min(SHEAR_CAP_MS) * SHEAR_PENALTY
}

fn drift_of(eval: &HourEvaluation) -> f64 {
    (1.0 - eval.factors.wind.normalized()) * 100.0
}

fn availability(evaluations: &[HourEvaluation]) -> Option<f64> {
    if evaluations.is_empty() {
        return None;
    }
    let n = evaluations.len() as f64;
    let good = evaluations
        .iter()
        .filter(|e| e.category == Category::Buona)
        .count() as f64;
    let workable = evaluations
        .iter()
        .filter(|e| e.category.is_workable())
        .count() as f64;
    Some((GOOD_HOURS_WEIGHT * good / n + WORKABLE_HOURS_WEIGHT * workable / n) * 100.0)
}

fn water_stress(points: &[HourPoint]) -> f64 {
    let humidity = mean(
        points
            .iter()
            .filter_map(|p| p.rh_pct.filter(|v| v.is_finite())),
    )
    .unwrap_or(NEUTRAL_HUMIDITY);
    let dryness = (100.0 - humidity).clamp(0.0, 100.0);

    let rain_total = points
        .iter()
        .filter_map(|p| p.rain_mm.filter(|v| v.is_finite() && *v > 0.0))
        .fold(0.0, |acc, v| acc + v);
    let rain_term = (1.0 - rain_total.min(RAIN_SATURATION_MM) / RAIN_SATURATION_MM) * 100.0;

    DRYNESS_WEIGHT * dryness + RAIN_WEIGHT * rain_term
}

/// Derive the four dashboard metrics around `now_index`.
///
/// `points` and `evaluations` are parallel; the shorter one bounds the series.
pub fn analyze_trends(
    points: &[HourPoint],
    evaluations: &[HourEvaluation],
    now_index: usize,
) -> TrendMetrics {
    let len = points.len().min(evaluations.len());
    let near = sub_window(len, now_index, NEAR_WINDOW_HOURS);
    let later = sub_window(len, near.end, LATER_WINDOW_HOURS);
    let later_present = !later.is_empty();

    // Stability: lower shear later means the air is settling.
    let near_shear = average_shear(&points[near.clone()]);
    let later_shear = if later_present {
        average_shear(&points[later.clone()])
    } else {
        None
    };
    let stability = MetricReading::new(
        near_shear
            .map(stability_from_shear)
            .unwrap_or(NEUTRAL_STABILITY),
        match near_shear {
            Some(near) => Trend::between(near, later_shear, SHEAR_DEAD_BAND).inverted(),
            None => Trend::Stable,
        },
    );

    // Drift: current hour against the near-window forecast.
    let current_drift = evaluations.get(now_index).filter(|_| now_index < len).map(drift_of);
    let near_drift = mean(evaluations[near.clone()].iter().map(drift_of));
    let drift_risk = MetricReading::new(
        current_drift.unwrap_or(NEUTRAL_DRIFT),
        match current_drift {
            Some(current) => Trend::between(current, near_drift, METRIC_DEAD_BAND),
            None => Trend::Stable,
        },
    );

    let near_availability = availability(&evaluations[near.clone()]).unwrap_or(NEUTRAL_AVAILABILITY);
    let later_availability = availability(&evaluations[later.clone()]);
    let window_availability = MetricReading::new(
        near_availability,
        Trend::between(near_availability, later_availability, METRIC_DEAD_BAND),
    );

    let near_stress = water_stress(&points[near.clone()]);
    let later_stress = later_present.then(|| water_stress(&points[later.clone()]));
    let water_stress = MetricReading::new(
        near_stress,
        Trend::between(near_stress, later_stress, METRIC_DEAD_BAND),
    );

    TrendMetrics {
        stability,
        drift_risk,
        window_availability,
        water_stress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::evaluator::evaluate_series;

    fn calm(h: usize) -> HourPoint {
        HourPoint::new(format!("2024-05-01T{:02}:00", h % 24))
            .with_wind(2.0, 3.0)
            .with_rain(0.0)
            .with_rain6h(0.0)
            .with_temp(20.0)
            .with_humidity(50.0)
    }

    fn run(points: &[HourPoint], now: usize) -> TrendMetrics {
        let evals = evaluate_series(points, None);
        analyze_trends(points, &evals, now)
    }

    #[test]
    fn sub_windows_are_clipped() {
        assert_eq!(sub_window(30, 5, 12), 5..17);
        assert_eq!(sub_window(30, 17, 12), 17..29);
        assert_eq!(sub_window(10, 12, 12), 10..10);
    }

    #[test]
    fn steady_series_is_stable_everywhere() {
        let points: Vec<HourPoint> = (0..24).map(calm).collect();
        let metrics = run(&points, 0);

        // Shear 1 m/s -> 85
        assert!((metrics.stability.value - 85.0).abs() < 1e-9);
        assert_eq!(metrics.stability.trend, Trend::Stable);
        assert_eq!(metrics.drift_risk.value, 0.0);
        assert_eq!(metrics.drift_risk.trend, Trend::Stable);
        assert_eq!(metrics.window_availability.rounded(), 100);
        assert_eq!(metrics.window_availability.trend, Trend::Stable);
        // dryness 50 * 0.6 + no rain 100 * 0.4
        assert!((metrics.water_stress.value - 70.0).abs() < 1e-9);
        assert_eq!(metrics.water_stress.trend, Trend::Stable);
    }

    #[test]
    fn shear_is_capped() {
        let points: Vec<HourPoint> = (0..4).map(|h| calm(h).with_wind(1.0, 12.0)).collect();
        let metrics = run(&points, 0);
        assert!((metrics.stability.value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn settling_wind_raises_stability_trend() {
        let mut points: Vec<HourPoint> = (0..12).map(|h| calm(h).with_wind(2.0, 5.0)).collect();
        points.extend((12..24).map(calm));
        let metrics = run(&points, 0);
        assert_eq!(metrics.stability.trend, Trend::Up);

        let mut points: Vec<HourPoint> = (0..12).map(calm).collect();
        points.extend((12..24).map(|h| calm(h).with_wind(2.0, 5.0)));
        assert_eq!(run(&points, 0).stability.trend, Trend::Down);
    }

    #[test]
    fn drift_rises_when_wind_picks_up() {
        let mut points = vec![calm(0)];
        points.extend((1..12).map(|h| calm(h).with_wind(10.0, 12.0)));
        let metrics = run(&points, 0);

        assert_eq!(metrics.drift_risk.value, 0.0);
        assert_eq!(metrics.drift_risk.trend, Trend::Up);
    }

    #[test]
    fn availability_blends_good_and_workable() {
        // 6 Buona, 6 Discreta in near window
        let mut points: Vec<HourPoint> = (0..6).map(calm).collect();
        points.extend((6..12).map(|h| calm(h).with_wind(10.0, 12.0)));
        // later window all Scarsa
        points.extend((12..24).map(|h| HourPoint::new(format!("2024-05-01T{:02}:00", h))));
        let metrics = run(&points, 0);

        // 0.7 * 0.5 + 0.3 * 1.0 = 0.65
        assert!((metrics.window_availability.value - 65.0).abs() < 1e-9);
        assert_eq!(metrics.window_availability.trend, Trend::Down);
    }

    #[test]
    fn rain_mitigates_water_stress() {
        let mut points: Vec<HourPoint> = (0..12).map(calm).collect();
        points.extend((12..24).map(|h| calm(h).with_rain(1.0)));
        let metrics = run(&points, 0);

        assert!((metrics.water_stress.value - 70.0).abs() < 1e-9);
        assert_eq!(metrics.water_stress.trend, Trend::Down);
    }

    #[test]
    fn missing_rain_counts_as_dry() {
        let points: Vec<HourPoint> = (0..4)
            .map(|h| HourPoint::new(format!("2024-05-01T{:02}:00", h)).with_humidity(50.0))
            .collect();
        let stress = water_stress(&points);

        // Dryness 50 at 0.6 plus a full rain term at 0.4
        assert!((stress - 70.0).abs() < 1e-9);
        assert!(!stress.is_sign_negative());
    }

    #[test]
    fn empty_later_window_is_stable() {
        let points: Vec<HourPoint> = (0..6).map(|h| calm(h).with_wind(2.0, 5.0)).collect();
        let metrics = run(&points, 0);
        assert_eq!(metrics.stability.trend, Trend::Stable);
        assert_eq!(metrics.window_availability.trend, Trend::Stable);
        assert_eq!(metrics.water_stress.trend, Trend::Stable);
    }

    #[test]
    fn empty_series_uses_neutral_values() {
        let metrics = run(&[], 0);
        assert_eq!(metrics.stability.value, 50.0);
        assert_eq!(metrics.drift_risk.value, 50.0);
        assert_eq!(metrics.window_availability.value, 0.0);
        assert!((metrics.water_stress.value - 70.0).abs() < 1e-9);
        assert_eq!(metrics.drift_risk.trend, Trend::Stable);
    }

    #[test]
    fn now_index_shifts_the_windows() {
        let mut points: Vec<HourPoint> = (0..6).map(|h| calm(h).with_wind(10.0, 12.0)).collect();
        points.extend((6..30).map(calm));
        let metrics = run(&points, 6);
        assert_eq!(metrics.drift_risk.value, 0.0);
        assert_eq!(metrics.window_availability.rounded(), 100);
    }
}
