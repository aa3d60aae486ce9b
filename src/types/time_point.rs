use crate::aggregators::composite_metrics::aggregate;
use crate::types::indicators::{CompositeMetrics, IndicatorSet};
use crate::utils::serdealizers::{flexible_datetime, lenient_f64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutcomeDirection {
    Up,
    Down,
    Flat,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Price move some period after the point, e.g. `"6M"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub direction: OutcomeDirection,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
}

pub type Outcomes = BTreeMap<String, Outcome>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Provenance {
    /// Pre-curated historical event.
    Curated,
    /// Built from a user-picked date or from a failed lookup.
    Custom,
    Other,
}

/// A dated snapshot of price, readings and composite scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TimePointRecord")]
pub struct TimePoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(with = "flexible_datetime")]
    pub date: DateTime<Utc>,
    pub name: String,
    pub price: Option<f64>,
    pub description: String,
    pub indicators: IndicatorSet,
    pub composite_metrics: CompositeMetrics,
    pub outcomes: Outcomes,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_custom_date: bool,
}

impl TimePoint {
    pub fn provenance(&self) -> Provenance {
        if self.id.is_some() {
            Provenance::Curated
        } else if self.is_custom_date {
            Provenance::Custom
        } else {
            Provenance::Other
        }
    }

    /// Displayable stand-in for a date the backend could not serve.
    pub fn error_point(date: DateTime<Utc>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            date,
            name: format!("Error for {}", date.format("%Y-%m-%d")),
            price: None,
            description: description.into(),
            indicators: IndicatorSet::new(),
            composite_metrics: CompositeMetrics::zeroed(),
            outcomes: Outcomes::new(),
            is_custom_date: true,
        }
    }
}

/// Wire form; points the backend sent without scores get them computed locally.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimePointRecord {
    #[serde(default)]
    id: Option<u64>,
    #[serde(with = "flexible_datetime")]
    date: DateTime<Utc>,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    indicators: IndicatorSet,
    #[serde(default)]
    composite_metrics: Option<CompositeMetrics>,
    #[serde(default)]
    outcomes: Outcomes,
    #[serde(default)]
    is_custom_date: bool,
}

impl From<TimePointRecord> for TimePoint {
    fn from(record: TimePointRecord) -> Self {
        let composite_metrics = record
            .composite_metrics
            .unwrap_or_else(|| aggregate(Some(&record.indicators)));
        Self {
            id: record.id,
            date: record.date,
            name: record.name,
            price: record.price,
            description: record.description,
            indicators: record.indicators,
            composite_metrics,
            outcomes: record.outcomes,
            is_custom_date: record.is_custom_date,
        }
    }
}
