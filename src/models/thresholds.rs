use serde::{Deserialize, Deserializer, Serialize};

/// The fourteen named cutoffs of a threshold set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdKey {
    WindGood,
    WindMid,
    GustGood,
    GustMid,
    RainGood,
    RainMid,
    TempGoodMin,
    TempGoodMax,
    TempMidMin,
    TempMidMax,
    RhGoodMin,
    RhGoodMax,
    RhMidMin,
    RhMidMax,
}

impl ThresholdKey {
    pub const ALL: [ThresholdKey; 14] = [
        ThresholdKey::WindGood,
        ThresholdKey::WindMid,
        ThresholdKey::GustGood,
        ThresholdKey::GustMid,
        ThresholdKey::RainGood,
        ThresholdKey::RainMid,
        ThresholdKey::TempGoodMin,
        ThresholdKey::TempGoodMax,
        ThresholdKey::TempMidMin,
        ThresholdKey::TempMidMax,
        ThresholdKey::RhGoodMin,
        ThresholdKey::RhGoodMax,
        ThresholdKey::RhMidMin,
        ThresholdKey::RhMidMax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdKey::WindGood => "windGood",
            ThresholdKey::WindMid => "windMid",
            ThresholdKey::GustGood => "gustGood",
            ThresholdKey::GustMid => "gustMid",
            ThresholdKey::RainGood => "rainGood",
            ThresholdKey::RainMid => "rainMid",
            ThresholdKey::TempGoodMin => "tempGoodMin",
            ThresholdKey::TempGoodMax => "tempGoodMax",
            ThresholdKey::TempMidMin => "tempMidMin",
            ThresholdKey::TempMidMax => "tempMidMax",
            ThresholdKey::RhGoodMin => "rhGoodMin",
            ThresholdKey::RhGoodMax => "rhGoodMax",
            ThresholdKey::RhMidMin => "rhMidMin",
            ThresholdKey::RhMidMax => "rhMidMax",
        }
    }
}

impl std::fmt::Display for ThresholdKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A complete, effective threshold set. Units: m/s for wind and gust,
/// mm over the next 6 hours for rain, °C and % for the two-sided ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub wind_good: f64,
    pub wind_mid: f64,
    pub gust_good: f64,
    pub gust_mid: f64,
    pub rain_good: f64,
    pub rain_mid: f64,
    pub temp_good_min: f64,
    pub temp_good_max: f64,
    pub temp_mid_min: f64,
    pub temp_mid_max: f64,
    pub rh_good_min: f64,
    pub rh_good_max: f64,
    pub rh_mid_min: f64,
    pub rh_mid_max: f64,
}

pub const DEFAULT_THRESHOLDS: Thresholds = Thresholds {
    wind_good: 4.0,
    wind_mid: 6.0,
    gust_good: 6.0,
    gust_mid: 8.0,
    rain_good: 0.2,
    rain_mid: 0.5,
    temp_good_min: 8.0,
    temp_good_max: 30.0,
    temp_mid_min: 5.0,
    temp_mid_max: 33.0,
    rh_good_min: 30.0,
    rh_good_max: 90.0,
    rh_mid_min: 20.0,
    rh_mid_max: 95.0,
};

impl Default for Thresholds {
    fn default() -> Self {
        DEFAULT_THRESHOLDS
    }
}

impl Thresholds {
    pub fn get(&self, key: ThresholdKey) -> f64 {
        match key {
            ThresholdKey::WindGood => self.wind_good,
            ThresholdKey::WindMid => self.wind_mid,
            ThresholdKey::GustGood => self.gust_good,
            ThresholdKey::GustMid => self.gust_mid,
            ThresholdKey::RainGood => self.rain_good,
            ThresholdKey::RainMid => self.rain_mid,
            ThresholdKey::TempGoodMin => self.temp_good_min,
            ThresholdKey::TempGoodMax => self.temp_good_max,
            ThresholdKey::TempMidMin => self.temp_mid_min,
            ThresholdKey::TempMidMax => self.temp_mid_max,
            ThresholdKey::RhGoodMin => self.rh_good_min,
            ThresholdKey::RhGoodMax => self.rh_good_max,
            ThresholdKey::RhMidMin => self.rh_mid_min,
            ThresholdKey::RhMidMax => self.rh_mid_max,
        }
    }

    fn slot(&mut self, key: ThresholdKey) -> &mut f64 {
        match key {
            ThresholdKey::WindGood => &mut self.wind_good,
            ThresholdKey::WindMid => &mut self.wind_mid,
            ThresholdKey::GustGood => &mut self.gust_good,
            ThresholdKey::GustMid => &mut self.gust_mid,
            ThresholdKey::RainGood => &mut self.rain_good,
            ThresholdKey::RainMid => &mut self.rain_mid,
            ThresholdKey::TempGoodMin => &mut self.temp_good_min,
            ThresholdKey::TempGoodMax => &mut self.temp_good_max,
            ThresholdKey::TempMidMin => &mut self.temp_mid_min,
            ThresholdKey::TempMidMax => &mut self.temp_mid_max,
            ThresholdKey::RhGoodMin => &mut self.rh_good_min,
            ThresholdKey::RhGoodMax => &mut self.rh_good_max,
            ThresholdKey::RhMidMin => &mut self.rh_mid_min,
            ThresholdKey::RhMidMax => &mut self.rh_mid_max,
        }
    }

    /// Layer the overrides over `self` in order; see [`merge`].
    pub fn merged<'a, I>(&self, overrides: I) -> Thresholds
    where
        I: IntoIterator<Item = Option<&'a ThresholdOverride>>,
    {
        merge(self, overrides)
    }
}

/// A partial threshold set. Keys whose value is absent or not a number are
/// carried as `None` and never overwrite a lower layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdOverride {
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub wind_good: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub wind_mid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub gust_good: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub gust_mid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rain_good: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rain_mid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub temp_good_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub temp_good_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub temp_mid_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub temp_mid_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rh_good_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rh_good_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rh_mid_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rh_mid_max: Option<f64>,
}

impl ThresholdOverride {
    pub fn get(&self, key: ThresholdKey) -> Option<f64> {
        match key {
            ThresholdKey::WindGood => self.wind_good,
            ThresholdKey::WindMid => self.wind_mid,
            ThresholdKey::GustGood => self.gust_good,
            ThresholdKey::GustMid => self.gust_mid,
            ThresholdKey::RainGood => self.rain_good,
            ThresholdKey::RainMid => self.rain_mid,
            ThresholdKey::TempGoodMin => self.temp_good_min,
            ThresholdKey::TempGoodMax => self.temp_good_max,
            ThresholdKey::TempMidMin => self.temp_mid_min,
            ThresholdKey::TempMidMax => self.temp_mid_max,
            ThresholdKey::RhGoodMin => self.rh_good_min,
            ThresholdKey::RhGoodMax => self.rh_good_max,
            ThresholdKey::RhMidMin => self.rh_mid_min,
            ThresholdKey::RhMidMax => self.rh_mid_max,
        }
    }

    pub fn with(mut self, key: ThresholdKey, value: f64) -> Self {
        let slot = match key {
            ThresholdKey::WindGood => &mut self.wind_good,
            ThresholdKey::WindMid => &mut self.wind_mid,
            ThresholdKey::GustGood => &mut self.gust_good,
            ThresholdKey::GustMid => &mut self.gust_mid,
            ThresholdKey::RainGood => &mut self.rain_good,
            ThresholdKey::RainMid => &mut self.rain_mid,
            ThresholdKey::TempGoodMin => &mut self.temp_good_min,
            ThresholdKey::TempGoodMax => &mut self.temp_good_max,
            ThresholdKey::TempMidMin => &mut self.temp_mid_min,
            ThresholdKey::TempMidMax => &mut self.temp_mid_max,
            ThresholdKey::RhGoodMin => &mut self.rh_good_min,
            ThresholdKey::RhGoodMax => &mut self.rh_good_max,
            ThresholdKey::RhMidMin => &mut self.rh_mid_min,
            ThresholdKey::RhMidMax => &mut self.rh_mid_max,
        };
        *slot = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        ThresholdKey::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeNumber {
        Number(f64),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<MaybeNumber>::deserialize(deserializer)? {
        Some(MaybeNumber::Number(value)) => Some(value),
        Some(MaybeNumber::Other(_)) | None => None,
    })
}

/// Compose a complete threshold set: every key takes the value of the last
/// override that defines it, or the base value when none does. Absent
/// override layers are skipped.
pub fn merge<'a, I>(base: &Thresholds, overrides: I) -> Thresholds
where
    I: IntoIterator<Item = Option<&'a ThresholdOverride>>,
{
    let mut merged = *base;
    for layer in overrides.into_iter().flatten() {
        for key in ThresholdKey::ALL {
            if let Some(value) = layer.get(key) {
                *merged.slot(key) = value;
            }
        }
    }
    merged
}

/// True iff all fourteen keys match exactly.
pub fn thresholds_equal(a: &Thresholds, b: &Thresholds) -> bool {
    ThresholdKey::ALL.iter().all(|k| a.get(*k) == b.get(*k))
}
