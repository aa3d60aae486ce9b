use crate::utils::serdealizers::lenient_f64;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use strum_macros::Display;

/// The oscillators the composite scores know how to weigh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorKey {
    Rsi,
    StochRsi,
    Mfi,
    Crsi,
    WilliamsR,
    Rvi,
    AdaptiveRsi,
}

impl IndicatorKey {
    pub const ALL: [IndicatorKey; 7] = [
        IndicatorKey::Rsi,
        IndicatorKey::StochRsi,
        IndicatorKey::Mfi,
        IndicatorKey::Crsi,
        IndicatorKey::WilliamsR,
        IndicatorKey::Rvi,
        IndicatorKey::AdaptiveRsi,
    ];

    /// Key used by the backend feed.
    pub fn wire_name(&self) -> &'static str {
        match self {
            IndicatorKey::Rsi => "rsi",
            IndicatorKey::StochRsi => "stochRsi",
            IndicatorKey::Mfi => "mfi",
            IndicatorKey::Crsi => "crsi",
            IndicatorKey::WilliamsR => "williamsR",
            IndicatorKey::Rvi => "rvi",
            IndicatorKey::AdaptiveRsi => "adaptiveRsi",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.wire_name() == name)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            IndicatorKey::Rsi => "RSI",
            IndicatorKey::StochRsi => "Stochastic RSI (%K)",
            IndicatorKey::Mfi => "MFI",
            IndicatorKey::Crsi => "Connors RSI",
            IndicatorKey::WilliamsR => "Williams %R",
            IndicatorKey::Rvi => "RVI",
            IndicatorKey::AdaptiveRsi => "Adaptive RSI",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TimeFrame {
    #[strum(serialize = "monthly")]
    Monthly,
    #[strum(serialize = "weekly")]
    Weekly,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 2] = [TimeFrame::Monthly, TimeFrame::Weekly];
}

/// One oscillator on both time frames. `None` means unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub monthly: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weekly: Option<f64>,
}

impl IndicatorReading {
    pub fn new(monthly: f64, weekly: f64) -> Self {
        Self {
            monthly: Some(monthly),
            weekly: Some(weekly),
        }
    }

    pub fn value(&self, frame: TimeFrame) -> Option<f64> {
        match frame {
            TimeFrame::Monthly => self.monthly,
            TimeFrame::Weekly => self.weekly,
        }
    }
}

/// Raw readings keyed by wire name. Unknown keys are kept so the set round-trips,
/// but only [`IndicatorKey`]s are ever aggregated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSet(BTreeMap<String, IndicatorReading>);

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: IndicatorKey, reading: IndicatorReading) -> Self {
        self.insert(key, reading);
        self
    }

    pub fn insert(&mut self, key: IndicatorKey, reading: IndicatorReading) {
        self.0.insert(key.wire_name().to_string(), reading);
    }

    pub fn insert_raw(&mut self, name: impl Into<String>, reading: IndicatorReading) {
        self.0.insert(name.into(), reading);
    }

    pub fn get(&self, key: IndicatorKey) -> Option<&IndicatorReading> {
        self.0.get(key.wire_name())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn recognized(&self) -> impl Iterator<Item = (IndicatorKey, &IndicatorReading)> {
        self.0
            .iter()
            .filter_map(|(name, reading)| IndicatorKey::from_wire_name(name).map(|key| (key, reading)))
    }

    pub fn unrecognized(&self) -> impl Iterator<Item = &str> {
        self.0
            .keys()
            .filter(|name| IndicatorKey::from_wire_name(name).is_none())
            .map(String::as_str)
    }
}

// A reading that is null or not an object degrades to "unavailable" instead of
// failing the whole payload.
impl<'de> Deserialize<'de> for IndicatorSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self(
            raw.into_iter()
                .map(|(name, value)| {
                    let reading = serde_json::from_value(value).unwrap_or_default();
                    (name, reading)
                })
                .collect(),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorePair {
    pub monthly: f64,
    pub weekly: f64,
}

impl ScorePair {
    pub fn get(&self, frame: TimeFrame) -> f64 {
        match frame {
            TimeFrame::Monthly => self.monthly,
            TimeFrame::Weekly => self.weekly,
        }
    }

    pub fn get_mut(&mut self, frame: TimeFrame) -> &mut f64 {
        match frame {
            TimeFrame::Monthly => &mut self.monthly,
            TimeFrame::Weekly => &mut self.weekly,
        }
    }

    pub fn clamped(self, min: f64, max: f64) -> Self {
        Self {
            monthly: self.monthly.clamp(min, max),
            weekly: self.weekly.clamp(min, max),
        }
    }
}

/// Composite Overbought Score and Bull Strength Index, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeMetrics {
    pub cos: ScorePair,
    pub bsi: ScorePair,
}

impl CompositeMetrics {
    pub fn zeroed() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for key in IndicatorKey::ALL {
            assert_eq!(IndicatorKey::from_wire_name(key.wire_name()), Some(key));
        }
        assert_eq!(IndicatorKey::from_wire_name("macd"), None);
    }

    #[test]
    fn test_indicator_set_tolerates_bad_readings() {
        let set: IndicatorSet = serde_json::from_str(
            r#"{
                "rsi": {"monthly": 71.2, "weekly": null},
                "mfi": null,
                "crsi": 12,
                "macd": {"monthly": 1.0, "weekly": 2.0}
            }"#,
        )
        .unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(
            set.get(IndicatorKey::Rsi),
            Some(&IndicatorReading { monthly: Some(71.2), weekly: None })
        );
        assert_eq!(set.get(IndicatorKey::Mfi), Some(&IndicatorReading::default()));
        assert_eq!(set.get(IndicatorKey::Crsi), Some(&IndicatorReading::default()));
        assert_eq!(set.recognized().count(), 3);
        assert_eq!(set.unrecognized().collect::<Vec<_>>(), vec!["macd"]);
    }

    #[test]
    fn test_indicator_set_null_is_empty() {
        let set: IndicatorSet = serde_json::from_str("null").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_composite_metrics_wire_shape() {
        let metrics = CompositeMetrics {
            cos: ScorePair { monthly: 17.5, weekly: 20.0 },
            bsi: ScorePair { monthly: 15.0, weekly: 0.0 },
        };
        let json = serde_json::to_value(metrics).unwrap();
        assert_eq!(json["cos"]["monthly"], 17.5);
        assert_eq!(json["bsi"]["weekly"], 0.0);
    }
}
