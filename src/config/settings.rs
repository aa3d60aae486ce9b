use crate::config::constants::{
    MIN_SELECTABLE_DATE, REFRESH_INTERVAL_MS, REQUEST_TIMEOUT_MS, RETRY_DELAY_MS, RETRY_LIMIT,
};
use chrono::NaiveDate;
use config::{Config, ConfigError, Environment, File};
use serde_derive::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[allow(unused)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    REQUEST_TIMEOUT_MS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub retry_limit: u32,
    pub retry_delay_ms: u64,
    pub refresh_interval_ms: u64,
    pub min_selectable_date: NaiveDate,
    /// Seed the historical store with two literal points when the backend list is unreachable.
    pub use_fallback_points: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            retry_limit: RETRY_LIMIT,
            retry_delay_ms: RETRY_DELAY_MS,
            refresh_interval_ms: REFRESH_INTERVAL_MS,
            min_selectable_date: NaiveDate::parse_from_str(MIN_SELECTABLE_DATE, "%Y-%m-%d")
                .unwrap_or(NaiveDate::MIN),
            use_fallback_points: true,
        }
    }
}

impl AcquisitionConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[allow(unused)]
pub struct LoggerConfig {
    pub(crate) level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(unused)]
pub struct Settings {
    pub backend: BackendConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    pub logger: LoggerConfig,
}

impl Settings {
    pub fn new(config_filename: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(config_filename))
            .add_source(Environment::with_prefix("DASHBOARD").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
