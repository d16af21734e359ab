use super::presets::PresetRegistry;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Storage key of the persisted preference blob
pub const PREFS_STORAGE_KEY: &str = "agri:spray:prefs";

pub const MIN_WINDOW_HOURS_MIN: f64 = 1.0;
pub const MIN_WINDOW_HOURS_MAX: f64 = 12.0;

/// The user's preset selection and minimum window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub selected_crop: String,
    pub selected_product: String,
    pub wind_sensitivity: String,
    pub min_window_hours: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            selected_crop: "standard".into(),
            selected_product: "fungicida".into(),
            wind_sensitivity: "balanced".into(),
            min_window_hours: 2.0,
        }
    }
}

pub fn valid_min_window(hours: f64) -> bool {
    hours.is_finite() && (MIN_WINDOW_HOURS_MIN..=MIN_WINDOW_HOURS_MAX).contains(&hours)
}

impl Preferences {
    /// Parse a persisted blob. Malformed JSON yields the defaults; every key
    /// that names an unknown preset or holds an out-of-range value is ignored
    /// on its own, keeping the compiled-in default for that setting.
    pub fn from_json(raw: &str, registry: &PresetRegistry) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value, registry),
            Err(e) => {
                warn!("Ignoring malformed stored preferences: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value, registry: &PresetRegistry) -> Self {
        let mut prefs = Self::default();
        let Some(object) = value.as_object() else {
            warn!("Ignoring stored preferences: not a JSON object");
            return prefs;
        };

        if let Some(raw) = object.get("selectedCrop") {
            match raw.as_str().filter(|k| registry.crop(k).is_some()) {
                Some(key) => prefs.selected_crop = key.to_string(),
                None => warn!("Ignoring stored crop preset {}", raw),
            }
        }

        if let Some(raw) = object.get("selectedProduct") {
            match raw.as_str().filter(|k| registry.product(k).is_some()) {
                Some(key) => prefs.selected_product = key.to_string(),
                None => warn!("Ignoring stored product preset {}", raw),
            }
        }

        if let Some(raw) = object.get("windSensitivity") {
            match raw.as_str().filter(|k| registry.wind_sensitivity(k).is_some()) {
                Some(key) => prefs.wind_sensitivity = key.to_string(),
                None => warn!("Ignoring stored wind sensitivity {}", raw),
            }
        }

        if let Some(raw) = object.get("minWindowHours") {
            match raw.as_f64().filter(|h| valid_min_window(*h)) {
                Some(hours) => prefs.min_window_hours = hours,
                None => warn!("Ignoring stored minimum window {}", raw),
            }
        }

        prefs
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_blob_round_trips() {
        let registry = PresetRegistry::builtin();
        let prefs = Preferences {
            selected_crop: "vite".into(),
            selected_product: "insetticida".into(),
            wind_sensitivity: "strict".into(),
            min_window_hours: 4.0,
        };
        let loaded = Preferences::from_json(&prefs.to_json().unwrap(), &registry);
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn unknown_keys_keep_defaults_individually() {
        let registry = PresetRegistry::builtin();
        let loaded = Preferences::from_json(
            r#"{"selectedCrop":"mango","selectedProduct":"diserbante","windSensitivity":7,"minWindowHours":48}"#,
            &registry,
        );
        let defaults = Preferences::default();

        assert_eq!(loaded.selected_crop, defaults.selected_crop);
        assert_eq!(loaded.selected_product, "diserbante");
        assert_eq!(loaded.wind_sensitivity, defaults.wind_sensitivity);
        assert_eq!(loaded.min_window_hours, defaults.min_window_hours);
    }

    #[test]
    fn malformed_blob_yields_defaults() {
        let registry = PresetRegistry::builtin();
        assert_eq!(
            Preferences::from_json("{not json", &registry),
            Preferences::default()
        );
        assert_eq!(
            Preferences::from_json("[1,2]", &registry),
            Preferences::default()
        );
    }

    #[test]
    fn min_window_range() {
        assert!(valid_min_window(1.0));
        assert!(valid_min_window(12.0));
        assert!(!valid_min_window(0.5));
        assert!(!valid_min_window(f64::NAN));
    }
}
