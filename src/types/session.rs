use crate::config::constants::LIVE_UNAVAILABLE_ERROR;
use crate::types::indicators::{CompositeMetrics, IndicatorSet};
use crate::types::time_point::TimePoint;
use crate::utils::serdealizers::serialize_option_datetime;
use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DataSource {
    #[default]
    Loading,
    Live,
    Mock,
    TimeMachine,
}

/// What the dashboard is currently showing and where it came from. Only the
/// orchestrator writes it; everyone else reads snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionSession {
    pub data_source: DataSource,
    pub loading: bool,
    pub error: Option<String>,
    pub active_point: Option<TimePoint>,
    #[serde(serialize_with = "serialize_option_datetime")]
    pub selected_date: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub indicators: Option<IndicatorSet>,
    pub composite_metrics: Option<CompositeMetrics>,
    pub price: Option<f64>,
    #[serde(serialize_with = "serialize_option_datetime")]
    pub last_update: Option<DateTime<Utc>>,
    /// Bumped whenever an operation supersedes in-flight work.
    #[serde(skip)]
    pub(crate) version: u64,
    /// A user-picked date is being fetched; periodic polling must not supersede it.
    #[serde(skip)]
    pub(crate) date_pending: bool,
}

impl Default for AcquisitionSession {
    fn default() -> Self {
        Self {
            data_source: DataSource::Loading,
            loading: true,
            error: None,
            active_point: None,
            selected_date: None,
            retry_count: 0,
            indicators: None,
            composite_metrics: None,
            price: None,
            last_update: None,
            version: 0,
            date_pending: false,
        }
    }
}

impl AcquisitionSession {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_date_pending(&self) -> bool {
        self.date_pending
    }

    pub fn is_time_machine(&self) -> bool {
        self.data_source == DataSource::TimeMachine
    }

    /// Whether the banner should offer "backend unavailable, retry".
    pub fn is_backend_unavailable(&self) -> bool {
        match self.data_source {
            DataSource::Mock => true,
            DataSource::TimeMachine => self.error.as_deref() == Some(LIVE_UNAVAILABLE_ERROR),
            _ => false,
        }
    }

    /// Show `point` as-is; its scores are trusted, never recomputed.
    pub(crate) fn show_point(&mut self, point: TimePoint) {
        self.selected_date = Some(point.date);
        self.indicators = Some(point.indicators.clone());
        self.composite_metrics = Some(point.composite_metrics);
        self.price = point.price;
        self.last_update = Some(point.date);
        self.active_point = Some(point);
        self.data_source = DataSource::TimeMachine;
        self.error = None;
        self.loading = false;
        self.date_pending = false;
    }
}
