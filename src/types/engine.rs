use crate::types::errors::FeedError;
use crate::types::feed::IndicatorsResponse;
use crate::types::time_point::TimePoint;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// The indicator backend as seen by the orchestrator.
#[async_trait]
pub trait IndicatorFeed: Send + Sync {
    /// Current readings.
    async fn current(&self) -> Result<IndicatorsResponse, FeedError>;

    /// Readings as of `date`.
    async fn for_date(&self, date: DateTime<Utc>) -> Result<IndicatorsResponse, FeedError>;

    /// Every curated historical point.
    async fn historical_points(&self) -> Result<Vec<TimePoint>, FeedError>;

    /// Ask the backend to re-evaluate today's data. Nobody waits on the answer.
    async fn trigger_refresh(&self) -> Result<(), FeedError>;
}

/// Source of delays, so retries and periodic refresh can run on a fake clock.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
