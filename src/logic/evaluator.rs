use super::scoring::{score_rain, score_rh, score_temp, score_wind};
use crate::models::{Category, FactorScore, FactorScores, HourEvaluation, HourPoint, Thresholds};

/// Number of factor reasons surfaced in an hour's brief
const BRIEF_REASONS: usize = 2;

/// Score the four factors of one hour and classify it.
pub fn evaluate_hour(point: &HourPoint, thresholds: Option<&Thresholds>) -> HourEvaluation {
    let factors = FactorScores {
        wind: score_wind(point.wind_ms, point.gust_ms, thresholds),
        rain6h: score_rain(point.rain6h_mm, thresholds),
        temp: score_temp(point.temp_c, thresholds),
        rh: score_rh(point.rh_pct, thresholds),
    };

    let total: f64 = factors.in_order().iter().map(|f| f.gained).sum();
    let score = total.round() as i32;
    let category = Category::from_score(score);
    let brief = brief(&factors.in_order());

    HourEvaluation {
        score,
        category,
        factors,
        brief,
    }
}

/// Evaluate every hour of a series.
pub fn evaluate_series(points: &[HourPoint], thresholds: Option<&Thresholds>) -> Vec<HourEvaluation> {
    points
        .iter()
        .map(|p| evaluate_hour(p, thresholds))
        .collect()
}

/// Best two reasons joined with `, `.
///
/// `sort_by_key` is stable, so factors of equal tier keep evaluation order
/// (wind, rain, temperature, humidity) and wind/rain win ties.
fn brief(factors: &[&FactorScore]) -> String {
    let mut ranked: Vec<&FactorScore> = factors.to_vec();
    ranked.sort_by_key(|f| f.tier.rank());
    ranked
        .iter()
        .take(BRIEF_REASONS)
        .map(|f| f.reason.as_str())
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Tier, DEFAULT_THRESHOLDS};

    fn ideal(ts: &str) -> HourPoint {
        HourPoint::new(ts)
            .with_wind(2.0, 3.0)
            .with_rain6h(0.0)
            .with_temp(20.0)
            .with_humidity(50.0)
    }

    #[test]
    fn ideal_hour_scores_full_marks() {
        let eval = evaluate_hour(&ideal("2024-05-01T08:00"), Some(&DEFAULT_THRESHOLDS));
        assert_eq!(eval.score, 100);
        assert_eq!(eval.category, Category::Buona);
        assert_eq!(
            eval.brief,
            "vento 2.0 m/s, raffiche 3.0 m/s, pioggia prossime 6h 0.0 mm"
        );
    }

    #[test]
    fn strong_wind_alone_is_discreta() {
        let point = ideal("2024-05-01T08:00").with_wind(10.0, 12.0);
        let eval = evaluate_hour(&point, None);

        assert_eq!(eval.factors.wind.tier, Tier::Bad);
        assert_eq!(eval.factors.wind.gained, 0.0);
        assert_eq!(eval.score, 70);
        assert_eq!(eval.category, Category::Discreta);
    }

    #[test]
    fn all_missing_hour_is_scarsa() {
        let eval = evaluate_hour(&HourPoint::new("2024-05-01T08:00"), None);

        for factor in eval.factors.in_order() {
            assert_eq!(factor.tier, Tier::Bad);
        }
        assert_eq!(eval.score, 0);
        assert_eq!(eval.category, Category::Scarsa);
    }

    #[test]
    fn score_is_rounded_sum_within_bounds() {
        let points = [
            ideal("a"),
            ideal("b").with_wind(5.0, 7.0),
            ideal("c").with_temp(6.0).with_humidity(93.0),
            ideal("d").with_rain6h(0.3).with_temp(45.0),
            HourPoint::new("e"),
        ];
        for point in &points {
            let eval = evaluate_hour(point, None);
            let sum: f64 = eval.factors.in_order().iter().map(|f| f.gained).sum();
            assert_eq!(eval.score, sum.round() as i32);
            assert!((0..=100).contains(&eval.score));
        }
    }

    #[test]
    fn brief_tie_break_relies_on_stable_sort() {
        // All four factors are bad: the brief must keep wind and rain,
        // the first two in evaluation order.
        let eval = evaluate_hour(&HourPoint::new("x"), None);
        assert_eq!(eval.brief, "vento — m/s (alto), pioggia 6h — mm (alta)");

        // Temperature and humidity good, wind and rain mid: the good ones lead.
        let point = ideal("y").with_wind(5.0, 7.0).with_rain6h(0.4);
        let eval = evaluate_hour(&point, None);
        assert_eq!(eval.brief, "T° 20.0°C, UR 50%");

        // Only humidity good, others mid: humidity first, then wind (mid, earliest).
        let point = HourPoint::new("z")
            .with_wind(5.0, 7.0)
            .with_rain6h(0.4)
            .with_temp(6.0)
            .with_humidity(50.0);
        let eval = evaluate_hour(&point, None);
        assert_eq!(eval.brief, "UR 50%, vento 5.0 m/s (moderato)");
    }

    #[test]
    fn evaluation_is_deterministic() {
        let points: Vec<HourPoint> = (0..6).map(|h| ideal(&format!("h{}", h))).collect();
        assert_eq!(
            evaluate_series(&points, None),
            evaluate_series(&points, None)
        );
    }
}
