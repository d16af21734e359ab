use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Number of hours summed, starting at the current one, for the forward rain value
pub const RAIN_SUM_HOURS: usize = 6;

/// One forecast hour. Timestamps are local civil time as returned by the provider
/// (e.g. `2024-05-01T06:00`), readings are nullable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourPoint {
    pub ts: String,
    pub temp_c: Option<f64>,
    pub rh_pct: Option<f64>,
    pub wind_ms: Option<f64>,
    pub gust_ms: Option<f64>,
    pub rain_mm: Option<f64>,
    #[serde(default)]
    pub wind_dir_deg: Option<f64>,
    /// Forward 6-hour rain sum, filled by [`fill_forward_rain`]
    #[serde(default)]
    pub rain6h_mm: Option<f64>,
}

impl HourPoint {
    pub fn new(ts: impl Into<String>) -> Self {
        Self {
            ts: ts.into(),
            temp_c: None,
            rh_pct: None,
            wind_ms: None,
            gust_ms: None,
            rain_mm: None,
            wind_dir_deg: None,
            rain6h_mm: None,
        }
    }

    pub fn with_wind(mut self, wind_ms: f64, gust_ms: f64) -> Self {
        self.wind_ms = Some(wind_ms);
        self.gust_ms = Some(gust_ms);
        self
    }

    pub fn with_temp(mut self, temp_c: f64) -> Self {
        self.temp_c = Some(temp_c);
        self
    }

    pub fn with_humidity(mut self, rh_pct: f64) -> Self {
        self.rh_pct = Some(rh_pct);
        self
    }

    pub fn with_rain(mut self, rain_mm: f64) -> Self {
        self.rain_mm = Some(rain_mm);
        self
    }

    pub fn with_rain6h(mut self, rain6h_mm: f64) -> Self {
        self.rain6h_mm = Some(rain6h_mm);
        self
    }

    /// Parsed timestamp, `None` when the provider string is not a recognised ISO 8601 form
    pub fn time(&self) -> Option<NaiveDateTime> {
        parse_local_time(&self.ts)
    }
}

/// Parse a provider timestamp as local civil time
pub fn parse_local_time(ts: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(ts)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Sum `len` values starting at `start`, counting missing or out-of-range entries as zero.
/// Rounded to two decimals.
pub fn sum_window(values: &[Option<f64>], start: usize, len: usize) -> f64 {
    let total = values
        .iter()
        .skip(start)
        .take(len)
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .fold(0.0, |acc, v| acc + v);
    (total * 100.0).round() / 100.0
}

/// Fill `rain6h_mm` on every point with the truncated forward sum of hourly rain.
pub fn fill_forward_rain(points: &mut [HourPoint]) {
    let rains: Vec<Option<f64>> = points.iter().map(|p| p.rain_mm).collect();
    for (i, point) in points.iter_mut().enumerate() {
        point.rain6h_mm = Some(sum_window(&rains, i, RAIN_SUM_HOURS));
    }
}

/// Index of the hour closest to `now`. Unparseable timestamps are skipped,
/// ties keep the earlier hour, and an empty series yields 0.
pub fn nearest_index(points: &[HourPoint], now: NaiveDateTime) -> usize {
    let mut best_idx = 0;
    let mut best_delta = i64::MAX;
    for (i, point) in points.iter().enumerate() {
        let Some(time) = point.time() else {
            continue;
        };
        let delta = (time - now).num_seconds().abs();
        if delta < best_delta {
            best_delta = delta;
            best_idx = i;
        }
    }
    best_idx
}

/// `HH:MM` of a provider timestamp, or the raw string if it does not parse
pub fn fmt_hh_mm(ts: &str) -> String {
    parse_local_time(ts)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn forward_rain_is_truncated_at_series_end() {
        let mut points: Vec<HourPoint> = (0..8)
            .map(|h| HourPoint::new(format!("2024-05-01T{:02}:00", h)).with_rain(0.1))
            .collect();
        fill_forward_rain(&mut points);

        assert_eq!(points[0].rain6h_mm, Some(0.6));
        assert_eq!(points[2].rain6h_mm, Some(0.6));
        // Only hours 5, 6, 7 remain
        assert_eq!(points[5].rain6h_mm, Some(0.3));
        assert_eq!(points[7].rain6h_mm, Some(0.1));
    }

    #[test]
    fn forward_rain_counts_missing_hours_as_dry() {
        let mut points = vec![
            HourPoint::new("2024-05-01T00:00").with_rain(1.0),
            HourPoint::new("2024-05-01T01:00"),
            HourPoint::new("2024-05-01T02:00").with_rain(0.25),
        ];
        fill_forward_rain(&mut points);

        assert_eq!(points[0].rain6h_mm, Some(1.25));
        assert_eq!(points[1].rain6h_mm, Some(0.25));
    }

    #[test]
    fn sum_window_out_of_range_is_zero() {
        let values = vec![Some(1.0), None, Some(2.0)];
        assert_eq!(sum_window(&values, 5, 6), 0.0);
        assert_eq!(sum_window(&values, 1, 6), 2.0);
    }

    #[test]
    fn all_missing_rain_sums_to_positive_zero() {
        let mut points = vec![
            HourPoint::new("2024-05-01T00:00"),
            HourPoint::new("2024-05-01T01:00"),
        ];
        fill_forward_rain(&mut points);

        let rain6h = points[0].rain6h_mm.unwrap();
        assert_eq!(rain6h, 0.0);
        assert!(!rain6h.is_sign_negative());
        assert_eq!(
            serde_json::to_value(&points[1]).unwrap()["rain6h_mm"].to_string(),
            "0.0"
        );
        assert!(!sum_window(&[None, Some(f64::NAN)], 0, 6).is_sign_negative());
    }

    #[test]
    fn nearest_index_picks_closest_hour() {
        let points: Vec<HourPoint> = (0..24)
            .map(|h| HourPoint::new(format!("2024-05-01T{:02}:00", h)))
            .collect();

        assert_eq!(nearest_index(&points, at(7)), 7);
        assert_eq!(
            nearest_index(&points, at(7) + chrono::Duration::minutes(40)),
            8
        );
        // Exactly half way keeps the earlier hour
        assert_eq!(
            nearest_index(&points, at(7) + chrono::Duration::minutes(30)),
            7
        );
    }

    #[test]
    fn nearest_index_skips_bad_timestamps() {
        let points = vec![
            HourPoint::new("garbage"),
            HourPoint::new("2024-05-01T10:00"),
        ];
        assert_eq!(nearest_index(&points, at(0)), 1);
        assert_eq!(nearest_index(&[], at(0)), 0);
    }

    #[test]
    fn fmt_hh_mm_formats_or_falls_back() {
        assert_eq!(fmt_hh_mm("2024-05-01T06:00"), "06:00");
        assert_eq!(fmt_hh_mm("2024-05-01T18:30:00"), "18:30");
        assert_eq!(fmt_hh_mm("n/a"), "n/a");
    }
}
