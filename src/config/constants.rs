use crate::types::indicators::{IndicatorKey, IndicatorReading, IndicatorSet};

// Live feed retries before falling back to historical/simulated data
pub const RETRY_LIMIT: u32 = 1;
pub const RETRY_DELAY_MS: u64 = 3_000;
// Periodic live refresh, skipped while the time machine is on
pub const REFRESH_INTERVAL_MS: u64 = 300_000;
pub const REQUEST_TIMEOUT_MS: u64 = 15_000;
// Oldest date the time machine lets users pick
pub const MIN_SELECTABLE_DATE: &str = "2017-01-01";

pub const INDICATORS_PATH: &str = "api/indicators";
pub const HISTORICAL_TIME_POINTS_PATH: &str = "api/historical_time_points";
pub const REFRESH_PATH: &str = "api/refresh";

pub const LIVE_UNAVAILABLE_ERROR: &str = "live source unavailable, showing most recent historical point";
pub const ALL_SOURCES_UNAVAILABLE_ERROR: &str =
    "live and historical sources both unavailable, showing simulated data";
pub const GENERIC_DATE_ERROR: &str = "failed to fetch complete data for this date";
pub const CUSTOM_POINT_DESCRIPTION: &str = "custom date selected by user, data from backend";

// Shown when neither the live feed nor any historical point is reachable
const SIMULATED_READINGS: [(IndicatorKey, f64, f64); 7] = [
    (IndicatorKey::Rsi, 68.0, 72.0),
    (IndicatorKey::StochRsi, 75.0, 82.0),
    (IndicatorKey::Mfi, 65.0, 78.0),
    (IndicatorKey::Crsi, 82.0, 88.0),
    (IndicatorKey::WilliamsR, -25.0, -18.0),
    (IndicatorKey::Rvi, 0.65, 0.72),
    (IndicatorKey::AdaptiveRsi, 70.0, 75.0),
];

pub fn simulated_indicators() -> IndicatorSet {
    SIMULATED_READINGS
        .iter()
        .fold(IndicatorSet::new(), |set, (key, monthly, weekly)| {
            set.with(*key, IndicatorReading::new(*monthly, *weekly))
        })
}

// Stand-ins when the historical list can't be fetched: (id, date, name, price)
pub const FALLBACK_POINTS: [(u64, &str, &str, f64); 2] = [
    (1, "2021-04-14", "Fallback Peak 1", 64_895.00),
    (2, "2021-11-10", "Fallback Peak 2", 69_000.00),
];
pub const FALLBACK_POINT_DESCRIPTION: &str = "Fallback data";
pub const OUTCOME_PERIODS: [&str; 3] = ["1M", "6M", "12M"];
