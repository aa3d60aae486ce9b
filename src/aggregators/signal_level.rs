use crate::aggregators::composite_metrics::threshold;
use crate::types::indicators::IndicatorKey;
use serde::Serialize;
use strum_macros::Display;

const SCORE_ELEVATED: f64 = 50.0;
const SCORE_OVERBOUGHT: f64 = 75.0;

/// Band of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreBand {
    Normal,
    Elevated,
    Overbought,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score > SCORE_OVERBOUGHT {
            ScoreBand::Overbought
        } else if score > SCORE_ELEVATED {
            ScoreBand::Elevated
        } else {
            ScoreBand::Normal
        }
    }
}

/// Band of a single oscillator reading on its own scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReadingBand {
    Unavailable,
    Neutral,
    Warm,
    Overbought,
}

fn warm_level(key: IndicatorKey) -> f64 {
    match key {
        IndicatorKey::WilliamsR => -50.0,
        IndicatorKey::Rvi => 0.5,
        _ => 50.0,
    }
}

impl ReadingBand {
    pub fn of(key: IndicatorKey, value: Option<f64>) -> Self {
        let Some(value) = value.filter(|v| v.is_finite()) else {
            return ReadingBand::Unavailable;
        };
        if value >= threshold(key) {
            ReadingBand::Overbought
        } else if value >= warm_level(key) {
            ReadingBand::Warm
        } else {
            ReadingBand::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::of(0.0), ScoreBand::Normal);
        assert_eq!(ScoreBand::of(50.0), ScoreBand::Normal);
        assert_eq!(ScoreBand::of(50.1), ScoreBand::Elevated);
        assert_eq!(ScoreBand::of(76.0), ScoreBand::Overbought);
        assert_eq!(ScoreBand::of(75.0), ScoreBand::Elevated);
        assert_eq!(ScoreBand::of(99.0), ScoreBand::Overbought);
        assert!(ScoreBand::Overbought > ScoreBand::Elevated);
    }

    #[test]
    fn test_reading_bands() {
        assert_eq!(ReadingBand::of(IndicatorKey::Rsi, None), ReadingBand::Unavailable);
        assert_eq!(ReadingBand::of(IndicatorKey::Rsi, Some(f64::NAN)), ReadingBand::Unavailable);
        assert_eq!(ReadingBand::of(IndicatorKey::Rsi, Some(70.0)), ReadingBand::Overbought);
        assert_eq!(ReadingBand::of(IndicatorKey::Rsi, Some(55.0)), ReadingBand::Warm);
        assert_eq!(ReadingBand::of(IndicatorKey::StochRsi, Some(79.0)), ReadingBand::Warm);
        assert_eq!(ReadingBand::of(IndicatorKey::Crsi, Some(40.0)), ReadingBand::Neutral);
        assert_eq!(ReadingBand::of(IndicatorKey::WilliamsR, Some(-10.0)), ReadingBand::Overbought);
        assert_eq!(ReadingBand::of(IndicatorKey::WilliamsR, Some(-45.0)), ReadingBand::Warm);
        assert_eq!(ReadingBand::of(IndicatorKey::WilliamsR, Some(-70.0)), ReadingBand::Neutral);
        assert_eq!(ReadingBand::of(IndicatorKey::Rvi, Some(0.72)), ReadingBand::Overbought);
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(ScoreBand::Overbought.to_string(), "overbought");
        assert_eq!(ReadingBand::Warm.to_string(), "warm");
    }
}
