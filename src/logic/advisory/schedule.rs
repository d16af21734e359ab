use super::{AdvisoryContext, AdvisoryRule, Finding};
use crate::logic::windows::min_run_hours;

/// Alternative windows listed after the best one
const ALTERNATIVES_SHOWN: usize = 2;

/// Window schedule rule - points at the best continuous window
///
/// With no window at all it cautions instead, suggesting to relax the
/// thresholds or postpone. It never proposes a time in that case.
pub struct WindowScheduleRule;

impl AdvisoryRule for WindowScheduleRule {
    fn id(&self) -> &'static str {
        "window_schedule"
    }

    fn name(&self) -> &'static str {
        "Finestra operativa"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<Finding> {
        let Some(best) = ctx.best_window() else {
            return vec![Finding::Caution(format!(
                "Nessuna finestra continua di almeno {} h nelle prossime ore: \
                 valuta di ricalibrare le soglie o di rimandare il trattamento.",
                min_run_hours(ctx.min_window_hours)
            ))];
        };

        let mut findings = vec![Finding::Action(format!(
            "Programma il trattamento tra {} ({}, conf. {}%).",
            best.time_label(),
            best.status,
            best.confidence
        ))];

        let alternatives: Vec<String> = ctx
            .windows
            .iter()
            .filter(|w| w.start_index != best.start_index)
            .take(ALTERNATIVES_SHOWN)
            .map(|w| w.time_label())
            .collect();
        if !alternatives.is_empty() {
            findings.push(Finding::Action(format!(
                "In alternativa: {}.",
                alternatives.join(", ")
            )));
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, OperationalWindow, DEFAULT_THRESHOLDS};

    fn window(start: usize, confidence: i32) -> OperationalWindow {
        OperationalWindow {
            start_index: start,
            end_index: start + 2,
            start_ts: format!("2024-05-01T{:02}:00", start),
            end_ts: format!("2024-05-01T{:02}:00", start + 2),
            status: Category::from_score(confidence),
            confidence,
            average_score: confidence as f64,
            reasons: vec![],
        }
    }

    #[test]
    fn best_window_is_scheduled_first() {
        let windows = vec![window(2, 80), window(8, 95), window(14, 95)];
        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS).with_windows(&windows);
        let findings = WindowScheduleRule.evaluate(&ctx);

        assert_eq!(
            findings[0],
            Finding::Action("Programma il trattamento tra 08:00-10:00 (Buona, conf. 95%).".into())
        );
        assert_eq!(
            findings[1],
            Finding::Action("In alternativa: 02:00-04:00, 14:00-16:00.".into())
        );
    }

    #[test]
    fn no_window_is_a_caution() {
        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS).with_selection(None, None, 3.0);
        let findings = WindowScheduleRule.evaluate(&ctx);

        assert_eq!(findings.len(), 1);
        match &findings[0] {
            Finding::Caution(text) => {
                assert!(text.contains("Nessuna finestra continua di almeno 3 h"))
            }
            other => panic!("unexpected finding {:?}", other),
        }
    }
}
