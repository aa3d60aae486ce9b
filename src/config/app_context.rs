use crate::collectors::backend_client::BackendClient;
use crate::config::settings::Settings;
use crate::engine::Orchestrator;
use crate::storage::historical_points::HistoricalPointStore;
use crate::utils::scheduler::TokioScheduler;
use anyhow::{Context, Result};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// everything the binary wires together once at startup
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub orchestrator: Orchestrator,
}

impl Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("settings", &self.settings)
            .finish()
    }
}

impl AppContext {
    pub fn new(config_filename: &str) -> Result<Self> {
        // loading settings
        let settings = Settings::new(config_filename)
            .with_context(|| format!("failed to load settings from {config_filename}"))?;

        // setting up logging
        let filter = tracing_subscriber::EnvFilter::new(&settings.logger.level)
            .add_directive("h2::codec=info".parse()?)
            .add_directive("hyper::client=info".parse()?)
            .add_directive("reqwest=info".parse()?)
            .add_directive("hyper::proto::h1=info".parse()?);
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(filter)
            .init();

        let client = BackendClient::new(
            &settings.backend.base_url,
            Duration::from_millis(settings.backend.request_timeout_ms),
        )?;
        info!("indicator backend at {}", settings.backend.base_url);

        let store = if settings.acquisition.use_fallback_points {
            HistoricalPointStore::new()
        } else {
            HistoricalPointStore::with_fallback(Vec::new())
        };
        let orchestrator = Orchestrator::new(
            Arc::new(client),
            Arc::new(TokioScheduler),
            store,
            settings.acquisition.clone(),
        );

        Ok(Self {
            settings: Arc::new(settings),
            orchestrator,
        })
    }
}
