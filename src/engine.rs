use crate::aggregators::composite_metrics::aggregate;
use crate::collectors::refresh_timer::{RefreshTarget, RefreshTimer};
use crate::config::constants::{
    simulated_indicators, ALL_SOURCES_UNAVAILABLE_ERROR, CUSTOM_POINT_DESCRIPTION, GENERIC_DATE_ERROR,
    LIVE_UNAVAILABLE_ERROR,
};
use crate::config::settings::AcquisitionConfig;
use crate::storage::historical_points::HistoricalPointStore;
use crate::types::engine::{IndicatorFeed, Scheduler};
use crate::types::feed::IndicatorsResponse;
use crate::types::session::{AcquisitionSession, DataSource};
use crate::types::time_point::TimePoint;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// The acquisition orchestrator. Decides where the displayed readings come from
/// (live feed, retry, historical or simulated fallback, a picked date) and owns the
/// session describing the result.
///
/// Every operation that starts new work bumps the session version; results that come
/// back after an await are only applied if that version is still current.
#[derive(Clone)]
pub struct Orchestrator {
    feed: Arc<dyn IndicatorFeed>,
    scheduler: Arc<dyn Scheduler>,
    store: HistoricalPointStore,
    config: AcquisitionConfig,
    session: Arc<watch::Sender<AcquisitionSession>>,
    date_picker_reset: Arc<watch::Sender<u64>>,
    refresh_timer: Arc<Mutex<Option<RefreshTimer>>>,
}

impl Orchestrator {
    pub fn new(
        feed: Arc<dyn IndicatorFeed>,
        scheduler: Arc<dyn Scheduler>,
        store: HistoricalPointStore,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            feed,
            scheduler,
            store,
            config,
            session: Arc::new(watch::channel(AcquisitionSession::default()).0),
            date_picker_reset: Arc::new(watch::channel(0).0),
            refresh_timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> AcquisitionSession {
        self.session.borrow().clone()
    }

    /// Receives a new snapshot after every applied change.
    pub fn subscribe(&self) -> watch::Receiver<AcquisitionSession> {
        self.session.subscribe()
    }

    /// Ticks whenever the date picker should be cleared.
    pub fn subscribe_date_picker_reset(&self) -> watch::Receiver<u64> {
        self.date_picker_reset.subscribe()
    }

    pub fn store(&self) -> &HistoricalPointStore {
        &self.store
    }

    fn begin(&self, start: impl FnOnce(&mut AcquisitionSession)) -> u64 {
        let mut version = 0;
        self.session.send_modify(|session| {
            session.version += 1;
            version = session.version;
            start(session);
        });
        version
    }

    fn commit(&self, version: u64, apply: impl FnOnce(&mut AcquisitionSession)) -> bool {
        let applied = self.session.send_if_modified(|session| {
            if session.version != version {
                return false;
            }
            apply(session);
            true
        });
        if !applied {
            debug!("session moved past version {version}, dropping result");
        }
        applied
    }

    /// Loads the historical store, fetches live data unless a point is already
    /// being shown, and arms the periodic refresh.
    pub async fn bootstrap(&self) {
        self.arm_refresh_timer().await;
        self.session.send_modify(|session| session.loading = true);
        self.store.load(self.feed.as_ref()).await;

        let showing_point = self.session.borrow().active_point.is_some();
        if showing_point {
            self.session.send_modify(|session| session.loading = false);
        } else {
            self.fetch_live(0).await;
        }
    }

    async fn arm_refresh_timer(&self) {
        let mut timer = self.refresh_timer.lock().await;
        if timer.is_none() {
            // the task gets its own empty timer slot so it never keeps this one alive
            let ticker = Orchestrator {
                refresh_timer: Arc::new(Mutex::new(None)),
                ..self.clone()
            };
            *timer = Some(RefreshTimer::spawn(
                Arc::new(ticker),
                self.scheduler.clone(),
                self.config.refresh_interval(),
            ));
        }
    }

    /// Cancels the periodic refresh. In-flight fetches are left to finish.
    /// Dropping the last clone of the orchestrator cancels it as well.
    pub async fn teardown(&self) {
        if let Some(timer) = self.refresh_timer.lock().await.take() {
            timer.cancel();
            info!("periodic refresh cancelled");
        }
    }

    /// Fetches live readings, retrying up to the configured limit before falling back
    /// to the newest historical point, or to simulated readings when there is none.
    pub async fn fetch_live(&self, attempt: u32) {
        let mut attempt = attempt;
        let version = self.begin(move |session| {
            session.loading = true;
            session.error = None;
            session.retry_count = attempt;
            session.date_pending = false;
        });

        loop {
            match self.feed.current().await {
                Ok(response) => {
                    if self.commit(version, |session| show_live(session, response)) {
                        info!("showing live data");
                    }
                    return;
                }
                Err(e) if attempt < self.config.retry_limit => {
                    let delay = self.config.retry_delay();
                    warn!("live fetch attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                    self.scheduler.sleep(delay).await;
                    attempt += 1;
                    let still_current = self.commit(version, move |session| {
                        session.loading = true;
                        session.error = None;
                        session.retry_count = attempt;
                    });
                    if !still_current {
                        return;
                    }
                }
                Err(e) => {
                    error!("live source unavailable after {} attempts: {e}", attempt + 1);
                    self.fall_back(version).await;
                    return;
                }
            }
        }
    }

    async fn fall_back(&self, version: u64) {
        if self.store.is_empty().await {
            self.store.load(self.feed.as_ref()).await;
        }

        if let Some(point) = self.store.latest_by_date().await {
            let name = point.name.clone();
            let applied = self.commit(version, |session| {
                session.show_point(point);
                session.error = Some(LIVE_UNAVAILABLE_ERROR.to_string());
            });
            if applied {
                warn!("falling back to historical point {name}");
            }
            return;
        }

        let indicators = simulated_indicators();
        let metrics = aggregate(Some(&indicators));
        let applied = self.commit(version, |session| {
            session.data_source = DataSource::Mock;
            session.active_point = None;
            session.selected_date = None;
            session.indicators = Some(indicators);
            session.composite_metrics = Some(metrics);
            session.price = None;
            session.last_update = Some(Utc::now());
            session.error = Some(ALL_SOURCES_UNAVAILABLE_ERROR.to_string());
            session.loading = false;
        });
        if applied {
            warn!("no historical points either, showing simulated data");
        }
    }

    /// User-requested refresh. Leaves the time machine if it is on; otherwise pokes the
    /// backend (best effort) and fetches live data.
    pub async fn refresh(&self) {
        let in_time_machine = self.session.borrow().is_time_machine();
        if in_time_machine {
            self.deactivate_time_machine().await;
            return;
        }

        let feed = self.feed.clone();
        tokio::spawn(async move {
            if let Err(e) = feed.trigger_refresh().await {
                warn!("refresh notification failed: {e}");
            }
        });
        self.fetch_live(0).await;
    }

    /// Shows `point` with its own readings and scores.
    pub fn activate_time_machine(&self, point: TimePoint) {
        info!(
            "time machine activated: {} ({})",
            point.name,
            point.date.format("%Y-%m-%d")
        );
        self.begin(|session| session.show_point(point));
    }

    /// Activates the stored historical point with `id`. Unknown ids change nothing.
    pub async fn select_historical(&self, id: u64) -> bool {
        match self.store.by_id(id).await {
            Some(point) => {
                self.activate_time_machine(point);
                true
            }
            None => {
                warn!("no historical point with id {id}");
                false
            }
        }
    }

    pub async fn deactivate_time_machine(&self) {
        self.begin(|session| {
            session.active_point = None;
            session.selected_date = None;
            if session.data_source == DataSource::TimeMachine {
                session.data_source = DataSource::Loading;
            }
        });
        self.date_picker_reset.send_modify(|resets| *resets += 1);
        info!("time machine deactivated");
        self.fetch_live(0).await;
    }

    /// Shows the backend's readings for `date`. Always ends on a displayable point:
    /// when there is no data an error point with zeroed scores is shown instead.
    pub async fn fetch_for_date(&self, date: DateTime<Utc>) {
        let version = self.begin(|session| {
            session.loading = true;
            session.error = None;
            session.selected_date = Some(date);
            session.date_pending = true;
        });

        if let Err(reason) = self.check_selectable(date) {
            warn!("{reason}");
            self.commit(version, |session| {
                session.show_point(TimePoint::error_point(date, reason))
            });
            return;
        }

        let (point, advisory) = match self.feed.for_date(date).await {
            Ok(response) if response.is_definitive_error() => {
                let description = response
                    .error
                    .unwrap_or_else(|| GENERIC_DATE_ERROR.to_string());
                warn!("no data for {}: {description}", date.format("%Y-%m-%d"));
                (TimePoint::error_point(date, description), None)
            }
            Ok(response) => {
                let advisory = response.error_message.clone();
                (custom_point(date, response), advisory)
            }
            Err(e) => {
                warn!("fetch for {} failed: {e}", date.format("%Y-%m-%d"));
                (TimePoint::error_point(date, e.user_message()), None)
            }
        };

        self.commit(version, |session| {
            session.show_point(point);
            session.error = advisory;
        });
    }

    fn check_selectable(&self, date: DateTime<Utc>) -> Result<(), String> {
        let day = date.date_naive();
        let today = Utc::now().date_naive();
        if day < self.config.min_selectable_date || day > today {
            return Err(format!(
                "{day} is outside the selectable range {} to {today}",
                self.config.min_selectable_date
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTarget for Orchestrator {
    async fn on_refresh_tick(&self) {
        let (in_time_machine, date_pending) = {
            let session = self.session.borrow();
            (session.is_time_machine(), session.is_date_pending())
        };
        if in_time_machine || date_pending {
            debug!("time machine active or date requested, skipping periodic refresh");
            return;
        }
        self.fetch_live(0).await;
    }
}

// Backend-computed scores are trusted; only missing ones are computed here.
fn show_live(session: &mut AcquisitionSession, response: IndicatorsResponse) {
    let indicators = response.indicators.unwrap_or_default();
    let metrics = response
        .composite_metrics
        .unwrap_or_else(|| aggregate(Some(&indicators)));
    session.data_source = DataSource::Live;
    session.active_point = None;
    session.selected_date = None;
    session.indicators = Some(indicators);
    session.composite_metrics = Some(metrics);
    session.price = response.price;
    session.last_update = Some(response.last_update.unwrap_or_else(Utc::now));
    session.error = response.error_message;
    session.loading = false;
}

fn custom_point(requested: DateTime<Utc>, response: IndicatorsResponse) -> TimePoint {
    let indicators = response.indicators.unwrap_or_default();
    let composite_metrics = response
        .composite_metrics
        .unwrap_or_else(|| aggregate(Some(&indicators)));
    TimePoint {
        id: None,
        date: response.last_update.unwrap_or(requested),
        name: response
            .name
            .unwrap_or_else(|| format!("Custom Date: {}", requested.format("%Y-%m-%d"))),
        price: response.price,
        description: response
            .description
            .unwrap_or_else(|| CUSTOM_POINT_DESCRIPTION.to_string()),
        indicators,
        composite_metrics,
        outcomes: response.outcomes.unwrap_or_default(),
        is_custom_date: true,
    }
}
