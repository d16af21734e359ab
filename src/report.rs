use crate::logic::{AdvisoryGenerator, SprayReport};
use crate::models::{
    AdviceSource, AdvisoryOutcome, AdvisoryRequest, MetricReading, PresetRegistry, Tier,
};
use std::fmt::Write;

/// Plain-text view of one run: field, current hour, windows, metrics and advice.
pub struct ReportView<'a> {
    pub report: &'a SprayReport,
    pub request: &'a AdvisoryRequest,
    pub outcome: &'a AdvisoryOutcome,
}

impl<'a> ReportView<'a> {
    pub fn new(
        report: &'a SprayReport,
        request: &'a AdvisoryRequest,
        outcome: &'a AdvisoryOutcome,
    ) -> Self {
        Self {
            report,
            request,
            outcome,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_header(&mut out);
        self.render_current(&mut out);
        self.render_windows(&mut out);
        self.render_metrics(&mut out);
        self.render_advice(&mut out);
        out
    }

    fn render_header(&self, out: &mut String) {
        let req = self.request;
        let _ = writeln!(out, "{}", req.location.name);
        let _ = writeln!(
            out,
            "{} | {} | vento: {} | finestra minima {} h",
            req.crop.label, req.product.label, req.wind_sensitivity.label, req.min_window_hours
        );
        out.push('\n');
    }

    fn render_current(&self, out: &mut String) {
        let (Some(eval), Some(point)) = (self.report.current(), self.report.current_point()) else {
            let _ = writeln!(out, "Nessun dato orario disponibile.");
            out.push('\n');
            return;
        };

        let _ = writeln!(
            out,
            "Ora {}: {} (indice {}%)",
            crate::models::fmt_hh_mm(&point.ts),
            eval.category,
            eval.score
        );
        if !eval.brief.is_empty() {
            let _ = writeln!(out, "  {}", eval.brief);
        }

        for factor in &self.request.factors {
            let _ = writeln!(
                out,
                "  {} {:<18} {:<22} soglia {}",
                tier_marker(factor.status),
                factor.name,
                factor.value,
                factor.threshold
            );
        }
        out.push('\n');
    }

    fn render_windows(&self, out: &mut String) {
        let _ = writeln!(out, "Finestre operative");
        if self.request.windows.is_empty() {
            let _ = writeln!(out, "  nessuna finestra continua rilevata");
        }
        for window in &self.request.windows {
            let _ = write!(
                out,
                "  {}  {} (conf. {}%)",
                window.time, window.status, window.confidence
            );
            if !window.reason.is_empty() {
                let _ = write!(out, "  {}", window.reason);
            }
            out.push('\n');
        }
        let hidden = self.report.windows.len() - self.request.windows.len();
        if hidden > 0 {
            let _ = writeln!(out, "  (+{} più avanti)", hidden);
        }
        out.push('\n');
    }

    fn render_metrics(&self, out: &mut String) {
        let Some(metrics) = &self.report.metrics else {
            return;
        };
        let _ = writeln!(out, "Indicatori");
        metric_line(out, "Stabilità", &metrics.stability);
        metric_line(out, "Rischio deriva", &metrics.drift_risk);
        metric_line(out, "Disponibilità finestre", &metrics.window_availability);
        metric_line(out, "Stress idrico", &metrics.water_stress);
        out.push('\n');
    }

    fn render_advice(&self, out: &mut String) {
        let advice = &self.outcome.advice;
        let source = match self.outcome.source {
            AdviceSource::Remote => "AI",
            AdviceSource::Local => "locale",
        };
        let _ = writeln!(out, "{} [{}]", advice.headline, source);
        if let Some(note) = &self.outcome.note {
            let _ = writeln!(out, "  ({})", note);
        }
        let _ = writeln!(out, "{}", advice.summary);

        if !advice.recommended_actions.is_empty() {
            let _ = writeln!(out, "Azioni consigliate:");
            for action in &advice.recommended_actions {
                let _ = writeln!(out, "  - {}", action);
            }
        }
        if !advice.cautions.is_empty() {
            let _ = writeln!(out, "Attenzione:");
            for caution in &advice.cautions {
                let _ = writeln!(out, "  ! {}", caution);
            }
        }
        if let Some(suggestion) = &advice.product_suggestion {
            let _ = writeln!(out, "Prodotto: {}", suggestion);
        }
    }
}

/// Preset keys accepted on the command line, plus the local advisory rules.
pub fn presets_listing(registry: &PresetRegistry, generator: &AdvisoryGenerator) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Crops (--crop)");
    for (key, crop) in &registry.crops {
        let _ = writeln!(out, "  {:<12} {:<24} {}", key, crop.label, crop.description);
    }

    let _ = writeln!(out, "\nProducts (--product)");
    for (key, product) in &registry.products {
        let window = product
            .suggested_min_window
            .map(|h| format!("min {} h", h))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<12} {:<24} {:<9} {}",
            key, product.label, window, product.description
        );
    }

    let _ = writeln!(out, "\nWind sensitivity (--wind)");
    for (key, wind) in &registry.wind_sensitivities {
        let _ = writeln!(out, "  {:<12} {:<24} {}", key, wind.label, wind.description);
    }

    let _ = writeln!(out, "\nAdvisory rules");
    for (id, name) in generator.list_rules() {
        let _ = writeln!(out, "  {:<20} {}", id, name);
    }

    out
}

fn tier_marker(tier: Tier) -> &'static str {
    match tier {
        Tier::Good => "+",
        Tier::Mid => "~",
        Tier::Bad => "-",
    }
}

fn metric_line(out: &mut String, label: &str, reading: &MetricReading) {
    let _ = writeln!(out, "  {:<24} {:>3}%  {}", label, reading.rounded(), reading.trend);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::analyze;
    use crate::models::{HourPoint, LocationRef, Preferences};
    use chrono::NaiveDate;

    fn series() -> Vec<HourPoint> {
        (0..8)
            .map(|h| {
                HourPoint::new(format!("2024-05-01T{:02}:00", 6 + h))
                    .with_wind(1.5, 2.5)
                    .with_temp(18.0)
                    .with_humidity(60.0)
                    .with_rain6h(0.0)
            })
            .collect()
    }

    fn render(points: &[HourPoint]) -> String {
        let registry = PresetRegistry::builtin();
        let prefs = Preferences::default();
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(6, 10, 0))
            .unwrap();
        let report = analyze(points, &registry, &prefs, now);
        let request = report.advisory_request(
            &registry,
            &prefs,
            LocationRef {
                lat: 44.5,
                lon: 11.3,
                name: "Bologna".into(),
            },
            "2024-05-01T06:10:00Z".into(),
        );
        let outcome = AdvisoryOutcome::local_fallback(report.advice.clone());
        ReportView::new(&report, &request, &outcome).render()
    }

    #[test]
    fn renders_all_sections() {
        let text = render(&series());
        assert!(text.starts_with("Bologna\n"));
        assert!(text.contains("Ora 06:00: Buona"));
        assert!(text.contains("06:00-13:00"));
        assert!(text.contains("Rischio deriva"));
        assert!(text.contains("[locale]"));
        assert!(text.contains("Parere AI non disponibile"));
    }

    #[test]
    fn presets_listing_includes_rules() {
        let text = presets_listing(&PresetRegistry::builtin(), &AdvisoryGenerator::new());
        assert!(text.contains("fungicida"));
        assert!(text.contains("min 3 h"));
        assert!(text.contains("balanced"));
        assert!(text.contains("Advisory rules\n  window_schedule"));
        assert!(text.contains("compatibility"));
    }

    #[test]
    fn empty_series_still_renders() {
        let text = render(&[]);
        assert!(text.contains("Nessun dato orario disponibile."));
        assert!(text.contains("nessuna finestra continua rilevata"));
        assert!(!text.contains("Indicatori"));
    }
}
