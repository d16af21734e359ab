use super::thresholds::Thresholds;
use serde::{Deserialize, Serialize};

/// Qualitative bucket a factor falls into relative to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Good,
    Mid,
    Bad,
}

impl Tier {
    /// Sort rank used when picking the reasons for an hour's brief
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Good => 0,
            Tier::Mid => 1,
            Tier::Bad => 2,
        }
    }

    /// Share of the factor weight earned at this tier
    pub fn multiplier(&self) -> f64 {
        match self {
            Tier::Good => 1.0,
            Tier::Mid => 0.6,
            Tier::Bad => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Good => "good",
            Tier::Mid => "mid",
            Tier::Bad => "bad",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall classification of one hour, or of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Buona,
    Discreta,
    Scarsa,
}

pub const CATEGORY_GOOD_MIN: i32 = 85;
pub const CATEGORY_FAIR_MIN: i32 = 50;

impl Category {
    pub fn from_score(score: i32) -> Self {
        if score >= CATEGORY_GOOD_MIN {
            Category::Buona
        } else if score >= CATEGORY_FAIR_MIN {
            Category::Discreta
        } else {
            Category::Scarsa
        }
    }

    pub fn is_workable(&self) -> bool {
        !matches!(self, Category::Scarsa)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Buona => "Buona",
            Category::Discreta => "Discreta",
            Category::Scarsa => "Scarsa",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Wind,
    Rain6h,
    Temp,
    Rh,
}

impl Factor {
    /// Evaluation order; also the tie-break order of the hour brief
    pub const ALL: [Factor; 4] = [Factor::Wind, Factor::Rain6h, Factor::Temp, Factor::Rh];

    pub fn weight(&self) -> f64 {
        match self {
            Factor::Wind => 30.0,
            Factor::Rain6h => 25.0,
            Factor::Temp => 20.0,
            Factor::Rh => 25.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Factor::Wind => "Velocità Vento",
            Factor::Rain6h => "Pioggia Prevista",
            Factor::Temp => "Temperatura",
            Factor::Rh => "Umidità Relativa",
        }
    }

    /// The "good" band of this factor under `thresholds`, e.g. `≤ 4 m/s`
    pub fn threshold_label(&self, thresholds: &Thresholds) -> String {
        match self {
            Factor::Wind => format!("≤ {} m/s", thresholds.wind_good),
            Factor::Rain6h => format!("≤ {} mm/6h", thresholds.rain_good),
            Factor::Temp => format!(
                "{}-{}°C",
                thresholds.temp_good_min, thresholds.temp_good_max
            ),
            Factor::Rh => format!("{}-{}%", thresholds.rh_good_min, thresholds.rh_good_max),
        }
    }
}

/// Points available per factor, summing to 100.
pub const WEIGHTS: [(Factor, f64); 4] = [
    (Factor::Wind, 30.0),
    (Factor::Rain6h, 25.0),
    (Factor::Temp, 20.0),
    (Factor::Rh, 25.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: Factor,
    pub tier: Tier,
    pub gained: f64,
    pub reason: String,
}

impl FactorScore {
    pub fn new(factor: Factor, tier: Tier, reason: impl Into<String>) -> Self {
        Self {
            factor,
            tier,
            gained: factor.weight() * tier.multiplier(),
            reason: reason.into(),
        }
    }

    /// Gained points over the factor weight, in [0, 1]
    pub fn normalized(&self) -> f64 {
        self.gained / self.factor.weight()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub wind: FactorScore,
    pub rain6h: FactorScore,
    pub temp: FactorScore,
    pub rh: FactorScore,
}

impl FactorScores {
    /// The four scores in evaluation order
    pub fn in_order(&self) -> [&FactorScore; 4] {
        [&self.wind, &self.rain6h, &self.temp, &self.rh]
    }

    pub fn get(&self, factor: Factor) -> &FactorScore {
        match factor {
            Factor::Wind => &self.wind,
            Factor::Rain6h => &self.rain6h,
            Factor::Temp => &self.temp,
            Factor::Rh => &self.rh,
        }
    }
}

/// Classification of one hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourEvaluation {
    pub score: i32,
    pub category: Category,
    pub factors: FactorScores,
    pub brief: String,
}
