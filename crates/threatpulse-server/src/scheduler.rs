use crate::pipeline::FeedPipeline;
use std::sync::Arc;
use tokio::time::{interval, Duration};

/// Periodic driver for the feed pipeline.
///
/// Fires once at startup and then every `poll_interval_secs`. Retry and
/// backoff policy stays here: a failed run is logged and the next tick
/// simply tries again, which is safe because every write is idempotent.
pub struct FeedScheduler {
    pipeline: Arc<FeedPipeline>,
    poll_interval_secs: u64,
}

impl FeedScheduler {
    pub fn new(pipeline: Arc<FeedPipeline>, poll_interval_secs: u64) -> Self {
        Self {
            pipeline,
            poll_interval_secs,
        }
    }

    pub async fn run(&self) {
        tracing::info!(
            poll_interval_secs = self.poll_interval_secs,
            "Feed scheduler started"
        );

        let mut tick = interval(Duration::from_secs(self.poll_interval_secs));
        loop {
            tick.tick().await;
            match self.pipeline.run_once().await {
                Ok(summary) => {
                    tracing::info!(
                        fetched = summary.fetched,
                        inserted = summary.inserted,
                        skipped = summary.skipped,
                        alerts_created = summary.alerts_created,
                        "Scheduled feed run finished"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled feed run failed");
                }
            }
        }
    }
}
