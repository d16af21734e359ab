//! Per-factor scoring of a single hour.
//!
//! Missing readings follow an explicit sentinel policy instead of implicit
//! coercion: for the "at most" checks (wind, gust, rain) a missing value is
//! positive infinity and fails every cutoff; for the two-sided ranges
//! (temperature, humidity) a missing or non-finite value is `bad` outright.

use crate::models::{Factor, FactorScore, Thresholds, Tier, DEFAULT_THRESHOLDS};

/// Sentinel for "≤" comparisons: absent readings never pass.
fn upper_bounded(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::INFINITY)
}

/// Sentinel for range comparisons: absent or non-finite readings are rejected.
fn ranged(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Half-up rounding for display; `{:.1}` alone rounds ties to even.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn fmt_or_dash(value: f64) -> String {
    if value.is_finite() {
        format!("{:.1}", round_to(value, 1))
    } else {
        "—".to_string()
    }
}

fn within(value: f64, min: f64, max: f64) -> bool {
    value >= min && value <= max
}

pub fn score_wind(
    wind_ms: Option<f64>,
    gust_ms: Option<f64>,
    thresholds: Option<&Thresholds>,
) -> FactorScore {
    let thr = thresholds.unwrap_or(&DEFAULT_THRESHOLDS);
    let w = upper_bounded(wind_ms);
    let g = upper_bounded(gust_ms);

    if w <= thr.wind_good && g <= thr.gust_good {
        return FactorScore::new(
            Factor::Wind,
            Tier::Good,
            format!("vento {:.1} m/s, raffiche {} m/s", round_to(w, 1), fmt_or_dash(g)),
        );
    }
    if w <= thr.wind_mid && g <= thr.gust_mid {
        return FactorScore::new(
            Factor::Wind,
            Tier::Mid,
            format!("vento {:.1} m/s (moderato)", round_to(w, 1)),
        );
    }
    FactorScore::new(
        Factor::Wind,
        Tier::Bad,
        format!("vento {} m/s (alto)", fmt_or_dash(w)),
    )
}

pub fn score_rain(rain6h_mm: Option<f64>, thresholds: Option<&Thresholds>) -> FactorScore {
    let thr = thresholds.unwrap_or(&DEFAULT_THRESHOLDS);
    let r = upper_bounded(rain6h_mm);

    if r <= thr.rain_good {
        return FactorScore::new(
            Factor::Rain6h,
            Tier::Good,
            format!("pioggia prossime 6h {:.1} mm", round_to(r, 1)),
        );
    }
    if r <= thr.rain_mid {
        return FactorScore::new(
            Factor::Rain6h,
            Tier::Mid,
            format!("pioggia 6h {:.1} mm (bassa)", round_to(r, 1)),
        );
    }
    FactorScore::new(
        Factor::Rain6h,
        Tier::Bad,
        format!("pioggia 6h {} mm (alta)", fmt_or_dash(r)),
    )
}

pub fn score_temp(temp_c: Option<f64>, thresholds: Option<&Thresholds>) -> FactorScore {
    let thr = thresholds.unwrap_or(&DEFAULT_THRESHOLDS);
    let Some(t) = ranged(temp_c) else {
        return FactorScore::new(Factor::Temp, Tier::Bad, "T° n/d");
    };

    if within(t, thr.temp_good_min, thr.temp_good_max) {
        FactorScore::new(
            Factor::Temp,
            Tier::Good,
            format!("T° {:.1}°C", round_to(t, 1)),
        )
    } else if within(t, thr.temp_mid_min, thr.temp_mid_max) {
        FactorScore::new(
            Factor::Temp,
            Tier::Mid,
            format!("T° {:.1}°C (accett.)", round_to(t, 1)),
        )
    } else {
        FactorScore::new(
            Factor::Temp,
            Tier::Bad,
            format!("T° {:.1}°C (limite)", round_to(t, 1)),
        )
    }
}

pub fn score_rh(rh_pct: Option<f64>, thresholds: Option<&Thresholds>) -> FactorScore {
    let thr = thresholds.unwrap_or(&DEFAULT_THRESHOLDS);
    let Some(rh) = ranged(rh_pct) else {
        return FactorScore::new(Factor::Rh, Tier::Bad, "UR n/d");
    };

    if within(rh, thr.rh_good_min, thr.rh_good_max) {
        FactorScore::new(
            Factor::Rh,
            Tier::Good,
            format!("UR {:.0}%", round_to(rh, 0)),
        )
    } else if within(rh, thr.rh_mid_min, thr.rh_mid_max) {
        FactorScore::new(
            Factor::Rh,
            Tier::Mid,
            format!("UR {:.0}% (accett.)", round_to(rh, 0)),
        )
    } else {
        FactorScore::new(
            Factor::Rh,
            Tier::Bad,
            format!("UR {:.0}% (limite)", round_to(rh, 0)),
        )
    }
}
