use super::{AdvisoryContext, AdvisoryRule, Finding};
use crate::models::Trend;

pub const WATER_STRESS_CAUTION_MIN: f64 = 60.0;

/// Water stress rule - stressed crops take up less product
pub struct WaterStressRule;

impl AdvisoryRule for WaterStressRule {
    fn id(&self) -> &'static str {
        "water_stress"
    }

    fn name(&self) -> &'static str {
        "Stress idrico"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<Finding> {
        let Some(metrics) = ctx.metrics else {
            return Vec::new();
        };
        let stress = metrics.water_stress;
        if stress.value < WATER_STRESS_CAUTION_MIN {
            return Vec::new();
        }

        let outlook = match stress.trend {
            Trend::Up => " e in aumento",
            Trend::Down => ", in calo nelle ore successive",
            Trend::Stable => "",
        };
        vec![Finding::Caution(format!(
            "Stress idrico elevato ({}%{}): preferisci le ore fresche del mattino per \
             favorire l'assorbimento.",
            stress.rounded(),
            outlook
        ))]
    }
}
