use super::thresholds::{merge, ThresholdKey, ThresholdOverride, Thresholds, DEFAULT_THRESHOLDS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPreset {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thresholds: ThresholdOverride,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPreset {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub adjustments: ThresholdOverride,
    /// Shortest window, in hours, worth scheduling this product into
    #[serde(default)]
    pub suggested_min_window: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindSensitivityPreset {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub overrides: ThresholdOverride,
}

/// Immutable lookup of the three preset families by key.
///
/// The registry is built once (built-ins plus any custom records from the
/// configuration file) and then only read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetRegistry {
    #[serde(default)]
    pub crops: BTreeMap<String, CropPreset>,
    #[serde(default)]
    pub products: BTreeMap<String, ProductPreset>,
    #[serde(default)]
    pub wind_sensitivities: BTreeMap<String, WindSensitivityPreset>,
}

fn layer(pairs: &[(ThresholdKey, f64)]) -> ThresholdOverride {
    pairs
        .iter()
        .fold(ThresholdOverride::default(), |acc, (key, value)| {
            acc.with(*key, *value)
        })
}

fn crop(label: &str, description: &str, pairs: &[(ThresholdKey, f64)]) -> CropPreset {
    CropPreset {
        label: label.to_string(),
        description: description.to_string(),
        thresholds: layer(pairs),
    }
}

fn product(
    label: &str,
    description: &str,
    pairs: &[(ThresholdKey, f64)],
    suggested_min_window: u32,
) -> ProductPreset {
    ProductPreset {
        label: label.to_string(),
        description: description.to_string(),
        adjustments: layer(pairs),
        suggested_min_window: Some(suggested_min_window),
    }
}

fn wind(label: &str, description: &str, pairs: &[(ThresholdKey, f64)]) -> WindSensitivityPreset {
    WindSensitivityPreset {
        label: label.to_string(),
        description: description.to_string(),
        overrides: layer(pairs),
    }
}

impl PresetRegistry {
    pub fn builtin() -> Self {
        use ThresholdKey::*;

        let mut crops = BTreeMap::new();
        crops.insert(
            "standard".to_string(),
            crop(
                "Standard",
                "Parametri generici adatti alla maggior parte delle colture.",
                &[],
            ),
        );
        crops.insert(
            "grano".to_string(),
            crop(
                "Grano",
                "Maggior tolleranza a temperature fresche e vento moderato.",
                &[
                    (TempGoodMin, 6.0),
                    (TempGoodMax, 28.0),
                    (TempMidMin, 3.0),
                    (TempMidMax, 32.0),
                    (RhGoodMin, 30.0),
                    (RhGoodMax, 85.0),
                    (WindGood, 5.0),
                    (WindMid, 7.0),
                    (GustGood, 7.0),
                    (GustMid, 9.0),
                    (RainGood, 0.3),
                    (RainMid, 0.6),
                ],
            ),
        );
        crops.insert(
            "vite".to_string(),
            crop(
                "Vite",
                "Preferisce vento debole, clima mite e UR medio-alta.",
                &[
                    (TempGoodMin, 10.0),
                    (TempGoodMax, 27.0),
                    (TempMidMin, 7.0),
                    (TempMidMax, 30.0),
                    (RhGoodMin, 40.0),
                    (RhGoodMax, 95.0),
                    (WindGood, 3.5),
                    (WindMid, 5.5),
                    (GustGood, 5.5),
                    (GustMid, 7.0),
                    (RainGood, 0.2),
                    (RainMid, 0.4),
                ],
            ),
        );
        crops.insert(
            "olivo".to_string(),
            crop(
                "Olivo",
                "Tollerante alle temperature alte, sensibile alla pioggia ravvicinata.",
                &[
                    (TempGoodMin, 8.0),
                    (TempGoodMax, 32.0),
                    (TempMidMin, 5.0),
                    (TempMidMax, 35.0),
                    (RhGoodMin, 25.0),
                    (RhGoodMax, 85.0),
                    (WindGood, 4.5),
                    (WindMid, 6.5),
                    (GustGood, 6.5),
                    (GustMid, 8.5),
                    (RainGood, 0.15),
                    (RainMid, 0.4),
                ],
            ),
        );

        let mut products = BTreeMap::new();
        products.insert(
            "fungicida".to_string(),
            product(
                "Fungicida",
                "Richiede UR medio-alta e pioggia limitata nelle ore successive.",
                &[
                    (RhGoodMin, 45.0),
                    (RhGoodMax, 95.0),
                    (RainGood, 0.15),
                    (RainMid, 0.35),
                ],
                3,
            ),
        );
        products.insert(
            "insetticida".to_string(),
            product(
                "Insetticida",
                "Predilige vento molto contenuto per limitare la deriva.",
                &[
                    (WindGood, 3.2),
                    (WindMid, 5.0),
                    (GustGood, 4.8),
                    (GustMid, 6.2),
                ],
                2,
            ),
        );
        products.insert(
            "diserbante".to_string(),
            product(
                "Diserbante",
                "Più tollerante al vento ma attenzione alla pioggia imminente.",
                &[
                    (WindGood, 4.8),
                    (WindMid, 6.8),
                    (GustGood, 6.8),
                    (GustMid, 8.8),
                    (RainGood, 0.25),
                    (RainMid, 0.6),
                ],
                2,
            ),
        );

        let mut wind_sensitivities = BTreeMap::new();
        wind_sensitivities.insert(
            "strict".to_string(),
            wind(
                "Alta (molto sensibile)",
                "Interventi solo con vento molto debole.",
                &[
                    (WindGood, 3.0),
                    (WindMid, 4.5),
                    (GustGood, 5.0),
                    (GustMid, 6.5),
                ],
            ),
        );
        wind_sensitivities.insert(
            "balanced".to_string(),
            wind(
                "Media",
                "Compromesso tra efficienza e operatività.",
                &[],
            ),
        );
        wind_sensitivities.insert(
            "tolerant".to_string(),
            wind(
                "Bassa (più tollerante)",
                "Consente trattamenti anche con vento leggermente più sostenuto.",
                &[
                    (WindGood, 4.8),
                    (WindMid, 6.8),
                    (GustGood, 6.8),
                    (GustMid, 8.5),
                ],
            ),
        );

        Self {
            crops,
            products,
            wind_sensitivities,
        }
    }

    /// Add custom records; a custom record replaces a built-in with the same key.
    pub fn extended_with(mut self, custom: &PresetRegistry) -> Self {
        self.crops
            .extend(custom.crops.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.products
            .extend(custom.products.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.wind_sensitivities.extend(
            custom
                .wind_sensitivities
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self
    }

    pub fn crop(&self, key: &str) -> Option<&CropPreset> {
        self.crops.get(key)
    }

    pub fn product(&self, key: &str) -> Option<&ProductPreset> {
        self.products.get(key)
    }

    pub fn wind_sensitivity(&self, key: &str) -> Option<&WindSensitivityPreset> {
        self.wind_sensitivities.get(key)
    }

    /// Effective thresholds: defaults, then crop, product and wind-sensitivity
    /// layers in that order. Unknown keys contribute no layer.
    pub fn resolve(&self, crop: &str, product: &str, wind_sensitivity: &str) -> Thresholds {
        merge(
            &DEFAULT_THRESHOLDS,
            [
                self.crop(crop).map(|p| &p.thresholds),
                self.product(product).map(|p| &p.adjustments),
                self.wind_sensitivity(wind_sensitivity).map(|p| &p.overrides),
            ],
        )
    }
}
