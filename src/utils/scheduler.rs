use crate::types::engine::Scheduler;
use async_trait::async_trait;
use std::time::Duration;

/// Delays on the tokio clock. Under `tokio::time::pause` tests never wait for real.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_uses_tokio_clock() {
        let start = Instant::now();
        TokioScheduler.sleep(Duration::from_millis(3000)).await;
        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert!(start.elapsed() < Duration::from_millis(3100));
    }
}
