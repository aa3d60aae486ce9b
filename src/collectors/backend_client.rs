use crate::config::constants::{HISTORICAL_TIME_POINTS_PATH, INDICATORS_PATH, REFRESH_PATH};
use crate::types::engine::IndicatorFeed;
use crate::types::errors::FeedError;
use crate::types::feed::{HistoricalPointsResponse, IndicatorsResponse};
use crate::types::time_point::TimePoint;
use crate::utils::serdealizers::to_iso_string;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// JSON-over-HTTP client for the indicator backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let mut base_url = Url::parse(base_url)?;
        // join() drops the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn indicators_url(&self, date: Option<DateTime<Utc>>) -> Result<Url, FeedError> {
        let mut url = self.base_url.join(INDICATORS_PATH)?;
        if let Some(date) = date {
            url.query_pairs_mut().append_pair("date", &to_iso_string(&date));
        }
        Ok(url)
    }

    pub(crate) fn historical_points_url(&self) -> Result<Url, FeedError> {
        Ok(self.base_url.join(HISTORICAL_TIME_POINTS_PATH)?)
    }

    pub(crate) fn refresh_url(&self) -> Result<Url, FeedError> {
        Ok(self.base_url.join(REFRESH_PATH)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FeedError> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Decode(e.to_string()))
    }
}

/// Turns a non-2xx answer into `FeedError::Status`, keeping the server's `error` text.
async fn ensure_success(response: Response) -> Result<Response, FeedError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FeedError::Status {
        status: status.as_u16(),
        message: server_error_message(&body),
    })
}

fn server_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl IndicatorFeed for BackendClient {
    async fn current(&self) -> Result<IndicatorsResponse, FeedError> {
        self.get_json(self.indicators_url(None)?).await
    }

    async fn for_date(&self, date: DateTime<Utc>) -> Result<IndicatorsResponse, FeedError> {
        self.get_json(self.indicators_url(Some(date))?).await
    }

    async fn historical_points(&self) -> Result<Vec<TimePoint>, FeedError> {
        let response: HistoricalPointsResponse = self.get_json(self.historical_points_url()?).await?;
        Ok(response.time_points)
    }

    async fn trigger_refresh(&self) -> Result<(), FeedError> {
        let url = self.refresh_url()?;
        debug!("POST {url}");
        let response = self.client.post(url).send().await?;
        ensure_success(response).await?;
        info!("backend acknowledged refresh");
        Ok(())
    }
}
