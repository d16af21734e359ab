use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    /// Direction of `later` relative to `near`, with a symmetric dead-band.
    /// A missing later value is stable.
    pub fn between(near: f64, later: Option<f64>, dead_band: f64) -> Self {
        match later {
            Some(later) if later > near + dead_band => Trend::Up,
            Some(later) if later < near - dead_band => Trend::Down,
            _ => Trend::Stable,
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Trend::Up => Trend::Down,
            Trend::Down => Trend::Up,
            Trend::Stable => Trend::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "↑ up",
            Trend::Down => "↓ down",
            Trend::Stable => "→ stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One dashboard metric: a value in [0, 100] and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub value: f64,
    pub trend: Trend,
}

impl MetricReading {
    pub fn new(value: f64, trend: Trend) -> Self {
        Self {
            value: value.clamp(0.0, 100.0),
            trend,
        }
    }

    pub fn rounded(&self) -> i32 {
        self.value.round() as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendMetrics {
    pub stability: MetricReading,
    pub drift_risk: MetricReading,
    pub window_availability: MetricReading,
    pub water_stress: MetricReading,
}
