use super::{AdvisoryContext, AdvisoryRule, Finding};
use crate::models::Category;

/// Current conditions rule - warns when the hour closest to now is not good
pub struct CurrentConditionsRule;

impl AdvisoryRule for CurrentConditionsRule {
    fn id(&self) -> &'static str {
        "current_conditions"
    }

    fn name(&self) -> &'static str {
        "Condizioni attuali"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<Finding> {
        let Some(current) = ctx.current else {
            return Vec::new();
        };

        match current.category {
            Category::Buona => Vec::new(),
            Category::Discreta => vec![Finding::Caution(format!(
                "Condizioni attuali solo discrete (indice {}%): monitora vento e umidità \
                 durante il trattamento.",
                current.score
            ))],
            Category::Scarsa => vec![Finding::Caution(format!(
                "Condizioni attuali scarse (indice {}%): evita di trattare adesso.",
                current.score
            ))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::evaluator::evaluate_hour;
    use crate::models::{HourPoint, DEFAULT_THRESHOLDS};

    #[test]
    fn only_poor_hours_warn() {
        let good = evaluate_hour(
            &HourPoint::new("t")
                .with_wind(2.0, 3.0)
                .with_rain6h(0.0)
                .with_temp(20.0)
                .with_humidity(50.0),
            None,
        );
        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS).with_current(Some(&good));
        assert!(CurrentConditionsRule.evaluate(&ctx).is_empty());

        let poor = evaluate_hour(&HourPoint::new("t"), None);
        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS).with_current(Some(&poor));
        assert_eq!(
            CurrentConditionsRule.evaluate(&ctx),
            vec![Finding::Caution(
                "Condizioni attuali scarse (indice 0%): evita di trattare adesso.".into()
            )]
        );
    }

    #[test]
    fn missing_current_is_silent() {
        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS);
        assert!(CurrentConditionsRule.evaluate(&ctx).is_empty());
    }
}
