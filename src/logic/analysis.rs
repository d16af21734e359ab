use chrono::NaiveDateTime;
use serde::Serialize;

use super::advisory::{AdvisoryContext, AdvisoryGenerator};
use super::evaluator::evaluate_series;
use super::trends::analyze_trends;
use super::windows::windows_from_evaluations;
use crate::models::{
    nearest_index, Advice, AdvisoryRequest, CurrentStatus, Factor, FactorSummary, HourEvaluation,
    HourPoint, LocationRef, OperationalWindow, PresetRef, PresetRegistry, Preferences, Thresholds,
    TrendMetrics, WindowSummary,
};

/// Windows shown to the user and sent to the remote advisor
pub const WINDOWS_SHOWN: usize = 3;

/// Everything computed for one series and one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprayReport {
    pub thresholds: Thresholds,
    pub min_window_hours: f64,
    /// Index of the hour closest to the reference time
    pub now_index: usize,
    pub hours: Vec<HourPoint>,
    pub evaluations: Vec<HourEvaluation>,
    /// Windows from `now_index` onward, indices against `hours`
    pub windows: Vec<OperationalWindow>,
    pub metrics: Option<TrendMetrics>,
    pub advice: Advice,
}

impl SprayReport {
    pub fn current(&self) -> Option<&HourEvaluation> {
        self.evaluations.get(self.now_index)
    }

    pub fn current_point(&self) -> Option<&HourPoint> {
        self.hours.get(self.now_index)
    }

    pub fn shown_windows(&self) -> &[OperationalWindow] {
        &self.windows[..self.windows.len().min(WINDOWS_SHOWN)]
    }

    /// Body for the remote advisory service.
    pub fn advisory_request(
        &self,
        registry: &PresetRegistry,
        prefs: &Preferences,
        location: LocationRef,
        timestamp: String,
    ) -> AdvisoryRequest {
        let factors = match (self.current(), self.current_point()) {
            (Some(eval), Some(point)) => Factor::ALL
                .iter()
                .map(|factor| FactorSummary {
                    name: factor.label().to_string(),
                    status: eval.factors.get(*factor).tier,
                    value: factor_value(*factor, point),
                    threshold: factor.threshold_label(&self.thresholds),
                    weight: factor.weight(),
                })
                .collect(),
            _ => Vec::new(),
        };

        let windows = self
            .shown_windows()
            .iter()
            .map(|w| WindowSummary {
                time: w.time_label(),
                status: w.status,
                confidence: w.confidence,
                reason: w.reason().to_string(),
            })
            .collect();

        AdvisoryRequest {
            timestamp,
            location,
            crop: preset_ref(&prefs.selected_crop, registry.crop(&prefs.selected_crop).map(|p| p.label.as_str())),
            product: preset_ref(
                &prefs.selected_product,
                registry.product(&prefs.selected_product).map(|p| p.label.as_str()),
            ),
            wind_sensitivity: preset_ref(
                &prefs.wind_sensitivity,
                registry
                    .wind_sensitivity(&prefs.wind_sensitivity)
                    .map(|p| p.label.as_str()),
            ),
            thresholds: self.thresholds,
            min_window_hours: self.min_window_hours,
            current: self.current().map(|e| CurrentStatus {
                status: e.category,
                score: e.score,
            }),
            factors,
            windows,
            hourly: self.hours.clone(),
        }
    }
}

fn preset_ref(key: &str, label: Option<&str>) -> PresetRef {
    PresetRef {
        key: key.to_string(),
        label: label.unwrap_or(key).to_string(),
    }
}

/// Display value of one factor at an hour, `n/d` when missing
pub fn factor_value(factor: Factor, point: &HourPoint) -> String {
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    match factor {
        Factor::Wind => match (finite(point.wind_ms), finite(point.gust_ms)) {
            (Some(w), Some(g)) => format!("{:.1} m/s (raffiche {:.1})", w, g),
            (Some(w), None) => format!("{:.1} m/s", w),
            _ => "n/d".to_string(),
        },
        Factor::Rain6h => finite(point.rain6h_mm)
            .map(|r| format!("{:.1} mm/6h", r))
            .unwrap_or_else(|| "n/d".to_string()),
        Factor::Temp => finite(point.temp_c)
            .map(|t| format!("{:.1}°C", t))
            .unwrap_or_else(|| "n/d".to_string()),
        Factor::Rh => finite(point.rh_pct)
            .map(|rh| format!("{:.0}%", rh))
            .unwrap_or_else(|| "n/d".to_string()),
    }
}

/// Run the whole engine once: thresholds, hour evaluations, windows from the
/// current hour onward, trend metrics and the local advice.
///
/// `now` is only used to locate the current hour.
pub fn analyze(
    points: &[HourPoint],
    registry: &PresetRegistry,
    prefs: &Preferences,
    now: NaiveDateTime,
) -> SprayReport {
    let thresholds = registry.resolve(
        &prefs.selected_crop,
        &prefs.selected_product,
        &prefs.wind_sensitivity,
    );
    let evaluations = evaluate_series(points, Some(&thresholds));
    let now_index = nearest_index(points, now);

    let windows = if points.is_empty() {
        Vec::new()
    } else {
        windows_from_evaluations(
            &points[now_index..],
            &evaluations[now_index..],
            prefs.min_window_hours,
            now_index,
        )
    };

    let metrics = (!points.is_empty()).then(|| analyze_trends(points, &evaluations, now_index));

    let crop_label = registry.crop(&prefs.selected_crop).map(|p| p.label.as_str());
    let ctx = AdvisoryContext::new(&thresholds)
        .with_current(evaluations.get(now_index))
        .with_windows(&windows)
        .with_metrics(metrics.as_ref())
        .with_selection(
            crop_label,
            registry.product(&prefs.selected_product),
            prefs.min_window_hours,
        );
    let advice = AdvisoryGenerator::new().generate(&ctx);

    SprayReport {
        thresholds,
        min_window_hours: prefs.min_window_hours,
        now_index,
        hours: points.to_vec(),
        evaluations,
        windows,
        metrics,
        advice,
    }
}
