use crate::types::indicators::{CompositeMetrics, IndicatorSet};
use crate::types::time_point::{Outcomes, TimePoint};
use crate::utils::serdealizers::{lenient_f64, option_flexible_datetime};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of `GET /api/indicators`, with or without `?date=`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorsResponse {
    #[serde(default)]
    pub indicators: Option<IndicatorSet>,
    #[serde(default)]
    pub composite_metrics: Option<CompositeMetrics>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub outcomes: Option<Outcomes>,
    #[serde(default, deserialize_with = "option_flexible_datetime")]
    pub last_update: Option<DateTime<Utc>>,
    /// Advisory only, the rest of the body is still good.
    #[serde(default, rename = "error_message")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl IndicatorsResponse {
    /// The backend had nothing at all for the request: no price and no readings.
    pub fn is_definitive_error(&self) -> bool {
        self.error.is_some() && self.price.map_or(true, |p| p == 0.0) && self.indicators.is_none()
    }
}

/// Body of `GET /api/historical_time_points`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPointsResponse {
    #[serde(default)]
    pub time_points: Vec<TimePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_body() {
        let response: IndicatorsResponse = serde_json::from_str(
            r#"{
                "indicators": {"rsi": {"monthly": 66.0, "weekly": 70.5}},
                "price": 64000.5,
                "name": "Current",
                "description": "Live",
                "outcomes": {},
                "lastUpdate": "2024-05-01T10:00:00Z",
                "error_message": "weekly MFI unavailable"
            }"#,
        )
        .unwrap();
        assert!(response.composite_metrics.is_none());
        assert_eq!(response.error_message.as_deref(), Some("weekly MFI unavailable"));
        assert!(response.last_update.is_some());
        assert!(!response.is_definitive_error());
    }

    #[test]
    fn test_no_data_body() {
        let response: IndicatorsResponse = serde_json::from_str(r#"{"error": "no data"}"#).unwrap();
        assert!(response.is_definitive_error());
    }

    #[test]
    fn test_error_with_readings_is_not_definitive() {
        let response: IndicatorsResponse =
            serde_json::from_str(r#"{"error": "partial", "indicators": {}}"#).unwrap();
        assert!(!response.is_definitive_error());
    }

    #[test]
    fn test_historical_body() {
        let response: HistoricalPointsResponse = serde_json::from_str(
            r#"{"timePoints": [{"id": 1, "date": "2021-04-14", "name": "Peak"}]}"#,
        )
        .unwrap();
        assert_eq!(response.time_points.len(), 1);
        assert_eq!(response.time_points[0].id, Some(1));
    }
}
