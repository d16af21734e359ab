use super::evaluation::{Category, Tier};
use super::hour::HourPoint;
use super::thresholds::Thresholds;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Human-readable advisory, the shape shared by the local generator and the
/// remote advisory service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub headline: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_suggestion: Option<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    #[serde(default)]
    pub cautions: Vec<String>,
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list_field(raw: &Value, key: &str) -> Option<Vec<String>> {
    raw.get(key)?
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

impl Advice {
    /// Take every well-typed field from a remote response body and the rest
    /// from `fallback`. A list with any non-string entry is discarded whole.
    pub fn reconcile(raw: &Value, fallback: &Advice) -> Advice {
        Advice {
            headline: string_field(raw, "headline").unwrap_or_else(|| fallback.headline.clone()),
            summary: string_field(raw, "summary").unwrap_or_else(|| fallback.summary.clone()),
            product_suggestion: string_field(raw, "productSuggestion")
                .or_else(|| fallback.product_suggestion.clone()),
            recommended_actions: string_list_field(raw, "recommendedActions")
                .unwrap_or_else(|| fallback.recommended_actions.clone()),
            cautions: string_list_field(raw, "cautions")
                .unwrap_or_else(|| fallback.cautions.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceSource {
    Remote,
    Local,
}

/// Advice plus where it came from. `note` carries the soft, user-visible
/// message shown when the remote opinion was unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryOutcome {
    pub advice: Advice,
    pub source: AdviceSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub const REMOTE_UNAVAILABLE_NOTE: &str = "Parere AI non disponibile: mostrato il parere locale.";

impl AdvisoryOutcome {
    pub fn remote(advice: Advice) -> Self {
        Self {
            advice,
            source: AdviceSource::Remote,
            note: None,
        }
    }

    pub fn local(advice: Advice) -> Self {
        Self {
            advice,
            source: AdviceSource::Local,
            note: None,
        }
    }

    pub fn local_fallback(advice: Advice) -> Self {
        Self {
            advice,
            source: AdviceSource::Local,
            note: Some(REMOTE_UNAVAILABLE_NOTE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRef {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentStatus {
    pub status: Category,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSummary {
    pub name: String,
    pub status: Tier,
    pub value: String,
    pub threshold: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub time: String,
    pub status: Category,
    pub confidence: i32,
    pub reason: String,
}

/// Body sent to the remote advisory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub timestamp: String,
    pub location: LocationRef,
    pub crop: PresetRef,
    pub product: PresetRef,
    pub wind_sensitivity: PresetRef,
    pub thresholds: Thresholds,
    pub min_window_hours: f64,
    pub current: Option<CurrentStatus>,
    pub factors: Vec<FactorSummary>,
    pub windows: Vec<WindowSummary>,
    pub hourly: Vec<HourPoint>,
}
