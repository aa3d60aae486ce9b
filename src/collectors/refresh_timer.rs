use crate::types::engine::Scheduler;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Whatever should happen on every tick.
#[async_trait]
pub trait RefreshTarget: Send + Sync {
    async fn on_refresh_tick(&self);
}

/// Background task calling [`RefreshTarget::on_refresh_tick`] every `interval`.
/// Aborted on [`RefreshTimer::cancel`] or drop.
#[derive(Debug)]
pub struct RefreshTimer {
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    pub fn spawn(
        target: Arc<dyn RefreshTarget>,
        scheduler: Arc<dyn Scheduler>,
        interval: Duration,
    ) -> Self {
        info!("arming periodic refresh every {interval:?}");
        let handle = tokio::spawn(async move {
            loop {
                scheduler.sleep(interval).await;
                debug!("periodic refresh tick");
                target.on_refresh_tick().await;
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
