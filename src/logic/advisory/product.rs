use super::{AdvisoryContext, AdvisoryRule, Finding};

pub const COMPATIBILITY_CHECK: &str =
    "Verifica compatibilità fitosanitaria con il tecnico di fiducia.";

/// Product window rule - the selected product asks for a longer window
/// than the one currently configured
pub struct ProductWindowRule;

impl AdvisoryRule for ProductWindowRule {
    fn id(&self) -> &'static str {
        "product_window"
    }

    fn name(&self) -> &'static str {
        "Durata minima per prodotto"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<Finding> {
        let Some(product) = ctx.product else {
            return Vec::new();
        };
        let Some(suggested) = product.suggested_min_window else {
            return Vec::new();
        };
        if ctx.min_window_hours >= suggested as f64 {
            return Vec::new();
        }

        vec![Finding::ProductSuggestion(format!(
            "Per {} è consigliata una finestra di almeno {} h: valuta di alzare la durata \
             minima (ora {} h).",
            product.label.to_lowercase(),
            suggested,
            ctx.min_window_hours
        ))]
    }
}

/// Compatibility rule - always reminds to check the product mix
pub struct CompatibilityRule;

impl AdvisoryRule for CompatibilityRule {
    fn id(&self) -> &'static str {
        "compatibility"
    }

    fn name(&self) -> &'static str {
        "Compatibilità fitosanitaria"
    }

    fn evaluate(&self, _ctx: &AdvisoryContext<'_>) -> Vec<Finding> {
        vec![Finding::Action(COMPATIBILITY_CHECK.to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PresetRegistry, DEFAULT_THRESHOLDS};

    #[test]
    fn suggests_longer_window_for_fungicide() {
        let registry = PresetRegistry::builtin();
        let fungicide = registry.product("fungicida");
        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS).with_selection(None, fungicide, 2.0);

        let findings = ProductWindowRule.evaluate(&ctx);
        assert_eq!(findings.len(), 1);
        assert!(matches!(&findings[0], Finding::ProductSuggestion(t) if t.contains("almeno 3 h")));

        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS).with_selection(None, fungicide, 3.0);
        assert!(ProductWindowRule.evaluate(&ctx).is_empty());
    }

    #[test]
    fn compatibility_always_present() {
        let ctx = AdvisoryContext::new(&DEFAULT_THRESHOLDS);
        assert_eq!(
            CompatibilityRule.evaluate(&ctx),
            vec![Finding::Action(COMPATIBILITY_CHECK.into())]
        );
    }
}
