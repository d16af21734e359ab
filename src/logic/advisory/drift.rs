use super::{AdvisoryContext, AdvisoryRule, Finding};

/// Drift risk at or above which the rule fires
pub const DRIFT_CAUTION_MIN: f64 = 60.0;

/// Drift rule - anti-drift nozzles and a wind ceiling from the active thresholds
///
/// Conditions:
/// - Drift risk metric >= 60
pub struct DriftRiskRule;

impl AdvisoryRule for DriftRiskRule {
    fn id(&self) -> &'static str {
        "drift_risk"
    }

    fn name(&self) -> &'static str {
        "Rischio deriva"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<Finding> {
        let Some(metrics) = ctx.metrics else {
            return Vec::new();
        };
        let drift = metrics.drift_risk;
        if drift.value < DRIFT_CAUTION_MIN {
            return Vec::new();
        }

        vec![Finding::Caution(format!(
            "Rischio deriva elevato ({}%): usa ugelli antideriva e tratta solo con vento \
             ≤ {} m/s e raffiche ≤ {} m/s.",
            drift.rounded(),
            ctx.thresholds.wind_good,
            ctx.thresholds.gust_good
        ))]
    }
}
