use super::{
    conditions::CurrentConditionsRule, drift::DriftRiskRule, factors::FactorCautionsRule,
    product::{CompatibilityRule, ProductWindowRule},
    schedule::WindowScheduleRule,
    water_stress::WaterStressRule,
    AdvisoryContext, AdvisoryRule, Finding,
};
use crate::models::{Advice, Category};

pub const STABLE_CONDITIONS: &str =
    "Condizioni generali stabili. Mantieni il monitoraggio meteo prima dell’intervento.";

/// Local, deterministic advisory: runs every rule in order and assembles
/// their findings into an [`Advice`].
pub struct AdvisoryGenerator {
    rules: Vec<Box<dyn AdvisoryRule>>,
}

impl AdvisoryGenerator {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn AdvisoryRule>> = vec![
            Box::new(WindowScheduleRule),
            Box::new(CurrentConditionsRule),
            Box::new(DriftRiskRule),
            Box::new(WaterStressRule),
            Box::new(FactorCautionsRule),
            Box::new(ProductWindowRule),
            Box::new(CompatibilityRule),
        ];

        Self { rules }
    }

    pub fn generate(&self, ctx: &AdvisoryContext<'_>) -> Advice {
        let Some(current) = ctx.current else {
            return select_area_advice();
        };

        let mut advice = Advice {
            headline: headline(current.category).to_string(),
            summary: summary(ctx, current.category, current.score),
            ..Advice::default()
        };

        for finding in self.rules.iter().flat_map(|rule| rule.evaluate(ctx)) {
            match finding {
                Finding::Action(text) => advice.recommended_actions.push(text),
                Finding::Caution(text) => advice.cautions.push(text),
                Finding::ProductSuggestion(text) => {
                    advice.product_suggestion.get_or_insert(text);
                }
            }
        }

        if advice.cautions.is_empty() {
            advice.cautions.push(STABLE_CONDITIONS.to_string());
        }

        advice
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }
}

impl Default for AdvisoryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn headline(category: Category) -> &'static str {
    match category {
        Category::Buona => "Condizioni favorevoli al trattamento",
        Category::Discreta => "Condizioni discrete: trattare con cautela",
        Category::Scarsa => "Condizioni sfavorevoli al trattamento",
    }
}

fn summary(ctx: &AdvisoryContext<'_>, category: Category, score: i32) -> String {
    let crop = ctx
        .crop_label
        .map(str::to_lowercase)
        .unwrap_or_else(|| "coltura selezionata".to_string());
    let product = ctx
        .product
        .map(|p| p.label.to_lowercase())
        .unwrap_or_else(|| "prodotto scelto".to_string());

    let mut text = format!(
        "Per {} con intervento {} le condizioni attuali sono {} (indice {}%).",
        crop,
        product,
        category.as_str().to_lowercase(),
        score
    );
    match ctx.best_window() {
        Some(best) => text.push_str(&format!(
            " Migliore finestra: {} (conf. {}%).",
            best.time_label(),
            best.confidence
        )),
        None => text.push_str(" Nessuna finestra continua rilevata."),
    }
    text
}

/// Shown when there is nothing to evaluate yet.
pub fn select_area_advice() -> Advice {
    Advice {
        headline: "Seleziona un'area".to_string(),
        summary: "Seleziona un'area o indica una località per ottenere il parere sulle \
                  condizioni di trattamento."
            .to_string(),
        product_suggestion: None,
        recommended_actions: vec![
            "Indica coordinate o una località per caricare le previsioni orarie.".to_string(),
        ],
        cautions: Vec::new(),
    }
}
