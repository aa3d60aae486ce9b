use crate::config::constants::{FALLBACK_POINTS, FALLBACK_POINT_DESCRIPTION, OUTCOME_PERIODS};
use crate::types::engine::IndicatorFeed;
use crate::types::indicators::{CompositeMetrics, IndicatorSet};
use crate::types::time_point::{Outcome, Outcomes, TimePoint};
use crate::utils::serdealizers::parse_flexible_datetime;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// The two literal peaks shown when the backend list can't be fetched.
pub fn fallback_points() -> Vec<TimePoint> {
    FALLBACK_POINTS
        .iter()
        .filter_map(|(id, date, name, price)| {
            Some(TimePoint {
                id: Some(*id),
                date: parse_flexible_datetime(date)?,
                name: name.to_string(),
                price: Some(*price),
                description: FALLBACK_POINT_DESCRIPTION.to_string(),
                indicators: IndicatorSet::new(),
                composite_metrics: CompositeMetrics::zeroed(),
                outcomes: OUTCOME_PERIODS
                    .iter()
                    .map(|period| (period.to_string(), Outcome::default()))
                    .collect::<Outcomes>(),
                is_custom_date: false,
            })
        })
        .collect()
}

/// Curated historical points, replaced wholesale on every load.
#[derive(Clone, Debug)]
pub struct HistoricalPointStore {
    points: Arc<RwLock<Arc<Vec<TimePoint>>>>,
    fallback: Arc<Vec<TimePoint>>,
}

impl Default for HistoricalPointStore {
    fn default() -> Self {
        Self::with_fallback(fallback_points())
    }
}

impl HistoricalPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that retains `fallback` when the backend list is unreachable.
    /// An empty fallback leaves the store empty after a failed load.
    pub fn with_fallback(fallback: Vec<TimePoint>) -> Self {
        Self {
            points: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            fallback: Arc::new(fallback),
        }
    }

    /// Fetches the full list and swaps it in.
    pub async fn load(&self, feed: &dyn IndicatorFeed) -> Arc<Vec<TimePoint>> {
        let loaded = match feed.historical_points().await {
            Ok(points) => {
                info!("loaded {} historical points", points.len());
                Arc::new(points)
            }
            Err(e) => {
                warn!(
                    "failed to load historical points: {e}, using {} fallback points",
                    self.fallback.len()
                );
                self.fallback.clone()
            }
        };
        *self.points.write().await = loaded.clone();
        loaded
    }

    pub async fn snapshot(&self) -> Arc<Vec<TimePoint>> {
        self.points.read().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }

    pub async fn by_id(&self, id: u64) -> Option<TimePoint> {
        self.points
            .read()
            .await
            .iter()
            .find(|point| point.id == Some(id))
            .cloned()
    }

    /// Most recent point; the first one listed wins a tie.
    pub async fn latest_by_date(&self) -> Option<TimePoint> {
        let points = self.snapshot().await;
        let mut sorted: Vec<&TimePoint> = points.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.first().map(|point| (*point).clone())
    }
}
