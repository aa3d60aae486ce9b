use crate::types::engine::{IndicatorFeed, Scheduler};
use crate::types::errors::FeedError;
use crate::types::feed::IndicatorsResponse;
use crate::types::indicators::{CompositeMetrics, IndicatorSet};
use crate::types::time_point::{Outcomes, TimePoint};
use crate::utils::serdealizers::parse_flexible_datetime;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

type Script<T> = Mutex<VecDeque<Result<T, FeedError>>>;

fn unscripted<T>() -> Result<T, FeedError> {
    Err(FeedError::Network("no scripted response".to_string()))
}

/// In-memory backend replaying canned answers. An exhausted script answers with a network error.
#[derive(Default)]
pub struct ScriptedFeed {
    current: Script<IndicatorsResponse>,
    for_date: Script<IndicatorsResponse>,
    historical: Script<Vec<TimePoint>>,
    current_gate: Mutex<Option<Arc<Notify>>>,
    for_date_delay: Mutex<Option<Duration>>,
    pub current_calls: AtomicUsize,
    pub for_date_calls: AtomicUsize,
    pub historical_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub requested_dates: Mutex<Vec<DateTime<Utc>>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_current(&self, response: Result<IndicatorsResponse, FeedError>) {
        self.current.lock().unwrap().push_back(response);
    }

    pub fn push_for_date(&self, response: Result<IndicatorsResponse, FeedError>) {
        self.for_date.lock().unwrap().push_back(response);
    }

    pub fn push_historical(&self, response: Result<Vec<TimePoint>, FeedError>) {
        self.historical.lock().unwrap().push_back(response);
    }

    /// Makes the next `current()` calls wait until the returned handle is notified.
    pub fn gate_current(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.current_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Makes every `for_date()` answer only after `delay` on the tokio clock.
    pub fn delay_for_date(&self, delay: Duration) {
        *self.for_date_delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndicatorFeed for ScriptedFeed {
    async fn current(&self) -> Result<IndicatorsResponse, FeedError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.current_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.current.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn for_date(&self, date: DateTime<Utc>) -> Result<IndicatorsResponse, FeedError> {
        self.for_date_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_dates.lock().unwrap().push(date);
        let delay = *self.for_date_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.for_date.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn historical_points(&self) -> Result<Vec<TimePoint>, FeedError> {
        self.historical_calls.fetch_add(1, Ordering::SeqCst);
        self.historical.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn trigger_refresh(&self) -> Result<(), FeedError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Err(FeedError::Status {
            status: 503,
            message: None,
        })
    }
}

/// Tokio-clock scheduler that remembers every delay it was asked for.
#[derive(Default)]
pub struct RecordingScheduler {
    pub delays: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
        tokio::time::sleep(duration).await;
    }
}

pub fn date(raw: &str) -> DateTime<Utc> {
    parse_flexible_datetime(raw).unwrap()
}

pub fn point(id: u64, raw_date: &str, name: &str) -> TimePoint {
    TimePoint {
        id: Some(id),
        date: date(raw_date),
        name: name.to_string(),
        price: Some(1_000.0 * id as f64),
        description: format!("{name} description"),
        indicators: IndicatorSet::new(),
        composite_metrics: CompositeMetrics::zeroed(),
        outcomes: Outcomes::new(),
        is_custom_date: false,
    }
}

pub fn response(json: &str) -> IndicatorsResponse {
    serde_json::from_str(json).unwrap()
}
