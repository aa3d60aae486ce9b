use crate::types::indicators::{CompositeMetrics, IndicatorKey, IndicatorSet, ScorePair, TimeFrame};
use tracing::trace;

// Per-oscillator COS contribution is capped so one extreme reading can't swamp the rest.
const COS_NORM_FLOOR: f64 = -50.0;
const COS_NORM_CEILING: f64 = 150.0;
const WILLIAMS_R_NEUTRAL: f64 = -50.0;
const NEUTRAL_SHARE_OF_THRESHOLD: f64 = 0.5;
const MIN_BSI_SPAN: f64 = 1e-6;

/// Share of the composite given to each oscillator. Sums to 1.
pub fn weight(key: IndicatorKey) -> f64 {
    match key {
        IndicatorKey::StochRsi => 0.30,
        IndicatorKey::Crsi => 0.20,
        IndicatorKey::Mfi => 0.20,
        IndicatorKey::Rsi => 0.15,
        IndicatorKey::WilliamsR => 0.10,
        IndicatorKey::Rvi => 0.03,
        IndicatorKey::AdaptiveRsi => 0.02,
    }
}

/// Overbought level of each oscillator on its own scale.
pub fn threshold(key: IndicatorKey) -> f64 {
    match key {
        IndicatorKey::Rsi => 70.0,
        IndicatorKey::StochRsi => 80.0,
        IndicatorKey::Mfi => 70.0,
        IndicatorKey::Crsi => 90.0,
        IndicatorKey::WilliamsR => -20.0,
        IndicatorKey::Rvi => 0.7,
        IndicatorKey::AdaptiveRsi => 70.0,
    }
}

/// "No bias" reading used as the BSI zero.
pub fn neutral_point(key: IndicatorKey) -> f64 {
    match key {
        IndicatorKey::WilliamsR => WILLIAMS_R_NEUTRAL,
        other => threshold(other) * NEUTRAL_SHARE_OF_THRESHOLD,
    }
}

/// Reading as a percentage of its overbought threshold, before weighting.
/// Williams %R runs from -100 to 0; any reading at or below the -20 line normalises to exactly 100.
pub fn cos_normalized(key: IndicatorKey, value: f64) -> f64 {
    let threshold = threshold(key);
    let norm = match key {
        IndicatorKey::WilliamsR if value <= threshold => 100.0,
        IndicatorKey::WilliamsR => value.abs() / threshold.abs() * 100.0,
        _ => value / threshold * 100.0,
    };
    norm.clamp(COS_NORM_FLOOR, COS_NORM_CEILING)
}

/// How far the reading has travelled from neutral towards overbought, in `[0, 100]`.
/// `None` when neutral and threshold coincide.
pub fn bsi_distance(key: IndicatorKey, value: f64) -> Option<f64> {
    let threshold = threshold(key);
    let neutral = neutral_point(key);
    let (numerator, span) = match key {
        IndicatorKey::WilliamsR => (neutral - value, neutral - threshold),
        _ => (value - neutral, threshold - neutral),
    };
    if span.abs() <= MIN_BSI_SPAN {
        return None;
    }
    Some((numerator / span * 100.0).clamp(0.0, 100.0))
}

/// Folds raw oscillator readings into COS and BSI for both time frames.
///
/// Unknown keys, and keys missing either time frame, are skipped. Their weight is not handed
/// to the remaining oscillators, so partial input scores lower than full input.
pub fn aggregate(indicators: Option<&IndicatorSet>) -> CompositeMetrics {
    let indicators = match indicators {
        Some(indicators) if !indicators.is_empty() => indicators,
        _ => return CompositeMetrics::zeroed(),
    };

    let mut cos = ScorePair::default();
    let mut bsi = ScorePair::default();
    for (key, reading) in indicators.recognized() {
        // a key counts only when both time frames carry a number
        let (Some(monthly), Some(weekly)) = (reading.monthly, reading.weekly) else {
            trace!("skipping {}: incomplete reading", key.wire_name());
            continue;
        };
        let weight = weight(key);
        for (frame, value) in [(TimeFrame::Monthly, monthly), (TimeFrame::Weekly, weekly)] {
            *cos.get_mut(frame) += weight * cos_normalized(key, value);
            if let Some(distance) = bsi_distance(key, value) {
                *bsi.get_mut(frame) += weight * distance;
            }
        }
    }

    CompositeMetrics {
        cos: cos.clamped(0.0, 100.0),
        bsi: bsi.clamped(0.0, 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::simulated_indicators;
    use crate::types::indicators::IndicatorReading;

    const EPS: f64 = 1e-6;

    fn single(key: IndicatorKey, monthly: f64, weekly: f64) -> IndicatorSet {
        IndicatorSet::new().with(key, IndicatorReading::new(monthly, weekly))
    }

    fn assert_in_range(metrics: &CompositeMetrics) {
        for pair in [metrics.cos, metrics.bsi] {
            for frame in TimeFrame::ALL {
                let v = pair.get(frame);
                assert!((0.0..=100.0).contains(&v), "{v} out of range");
            }
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = IndicatorKey::ALL.iter().map(|k| weight(*k)).sum();
        assert!((total - 1.0).abs() < EPS);
    }

    #[test]
    fn test_empty_input_is_zeroed() {
        assert_eq!(aggregate(None), CompositeMetrics::zeroed());
        assert_eq!(aggregate(Some(&IndicatorSet::new())), CompositeMetrics::zeroed());
    }

    #[test]
    fn test_rsi_only() {
        let metrics = aggregate(Some(&single(IndicatorKey::Rsi, 80.0, 80.0)));
        let expected_cos = 0.15 * (80.0 / 70.0 * 100.0);
        assert!((metrics.cos.monthly - expected_cos).abs() < EPS);
        assert!((metrics.cos.weekly - 17.142857).abs() < 1e-4);
        assert!((metrics.bsi.monthly - 15.0).abs() < EPS);
        assert!((metrics.bsi.weekly - 15.0).abs() < EPS);
    }

    #[test]
    fn test_williams_r_at_or_below_line_is_fully_overbought() {
        for value in [-20.0, -25.0, -60.0, -100.0] {
            assert_eq!(cos_normalized(IndicatorKey::WilliamsR, value), 100.0);
        }
        assert!((cos_normalized(IndicatorKey::WilliamsR, -10.0) - 50.0).abs() < EPS);
    }

    #[test]
    fn test_cos_norm_is_capped() {
        assert_eq!(cos_normalized(IndicatorKey::Rvi, 5.0), 150.0);
        assert_eq!(cos_normalized(IndicatorKey::Rvi, -5.0), -50.0);
    }

    #[test]
    fn test_bsi_neutral_points() {
        assert_eq!(neutral_point(IndicatorKey::Rsi), 35.0);
        assert_eq!(neutral_point(IndicatorKey::Crsi), 45.0);
        assert_eq!(neutral_point(IndicatorKey::WilliamsR), -50.0);
        assert_eq!(bsi_distance(IndicatorKey::Rsi, 35.0), Some(0.0));
        assert_eq!(bsi_distance(IndicatorKey::Rsi, 10.0), Some(0.0));
        // -50 neutral, -20 threshold, span = -30
        assert_eq!(bsi_distance(IndicatorKey::WilliamsR, -50.0), Some(0.0));
        assert_eq!(bsi_distance(IndicatorKey::WilliamsR, -20.0), Some(100.0));
        assert_eq!(bsi_distance(IndicatorKey::WilliamsR, -80.0), Some(0.0));
        assert_eq!(bsi_distance(IndicatorKey::WilliamsR, -35.0), Some(50.0));
    }

    #[test]
    fn test_half_present_reading_contributes_nothing() {
        let half = |monthly: Option<f64>, weekly: Option<f64>| {
            IndicatorSet::new().with(IndicatorKey::Rsi, IndicatorReading { monthly, weekly })
        };
        assert_eq!(aggregate(Some(&half(Some(80.0), None))), CompositeMetrics::zeroed());
        assert_eq!(aggregate(Some(&half(None, Some(80.0)))), CompositeMetrics::zeroed());

        // the complete key still scores next to an incomplete one
        let mut mixed = half(Some(80.0), None);
        mixed.insert(IndicatorKey::Mfi, IndicatorReading::new(70.0, 35.0));
        let metrics = aggregate(Some(&mixed));
        assert!((metrics.cos.monthly - 20.0).abs() < EPS);
        assert!((metrics.cos.weekly - 10.0).abs() < EPS);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut set = IndicatorSet::new();
        set.insert_raw("macd", IndicatorReading::new(500.0, 500.0));
        assert_eq!(aggregate(Some(&set)), CompositeMetrics::zeroed());

        set.insert(IndicatorKey::Mfi, IndicatorReading::new(70.0, 35.0));
        let metrics = aggregate(Some(&set));
        assert!((metrics.cos.monthly - 20.0).abs() < EPS);
        assert!((metrics.cos.weekly - 10.0).abs() < EPS);
    }

    #[test]
    fn test_missing_weight_is_not_redistributed() {
        // every oscillator sitting exactly on its threshold
        let full = IndicatorKey::ALL.iter().fold(IndicatorSet::new(), |set, key| {
            let t = threshold(*key);
            set.with(*key, IndicatorReading::new(t, t))
        });
        let full_metrics = aggregate(Some(&full));
        assert!((full_metrics.cos.monthly - 100.0).abs() < 1e-9);
        assert!((full_metrics.bsi.monthly - 100.0).abs() < 1e-9);

        let partial = single(IndicatorKey::StochRsi, 80.0, 80.0);
        let partial_metrics = aggregate(Some(&partial));
        assert!((partial_metrics.cos.monthly - 30.0).abs() < EPS);
        assert!((partial_metrics.bsi.monthly - 30.0).abs() < EPS);
    }

    #[test]
    fn test_results_stay_in_range() {
        let extreme_high = IndicatorKey::ALL.iter().fold(IndicatorSet::new(), |set, key| {
            set.with(*key, IndicatorReading::new(1e6, 1e6))
        });
        let extreme_low = IndicatorKey::ALL.iter().fold(IndicatorSet::new(), |set, key| {
            set.with(*key, IndicatorReading::new(-1e6, -1e6))
        });
        for set in [extreme_high, extreme_low, simulated_indicators()] {
            assert_in_range(&aggregate(Some(&set)));
        }
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let set = simulated_indicators();
        assert_eq!(aggregate(Some(&set)), aggregate(Some(&set)));
    }
}
