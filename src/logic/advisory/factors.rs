use super::{AdvisoryContext, AdvisoryRule, Finding};
use crate::models::Tier;

/// Factor cautions rule - one caution per factor of the current hour that is
/// not in its good band, restating the band
pub struct FactorCautionsRule;

impl AdvisoryRule for FactorCautionsRule {
    fn id(&self) -> &'static str {
        "factor_cautions"
    }

    fn name(&self) -> &'static str {
        "Fattori fuori soglia"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<Finding> {
        let Some(current) = ctx.current else {
            return Vec::new();
        };

        current
            .factors
            .in_order()
            .into_iter()
            .filter(|f| f.tier != Tier::Good)
            .map(|f| {
                Finding::Caution(format!(
                    "{}: {} (soglia {}).",
                    f.factor.label(),
                    f.reason,
                    f.factor.threshold_label(ctx.thresholds)
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::evaluator::evaluate_hour;
    use crate::models::{HourPoint, DEFAULT_THRESHOLDS};

    #[test]
    fn non_good_factors_become_cautions() {
        let eval = evaluate_hour(
            &HourPoint::new("t")
                .with_wind(5.0, 7.0)
                .with_rain6h(0.0)
                .with_temp(20.0),
            None,
        );
        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS).with_current(Some(&eval));

        assert_eq!(
            FactorCautionsRule.evaluate(&ctx),
            vec![
                Finding::Caution(
                    "Velocità Vento: vento 5.0 m/s (moderato) (soglia ≤ 4 m/s).".into()
                ),
                Finding::Caution("Umidità Relativa: UR n/d (soglia 30-90%).".into()),
            ]
        );
    }
}
