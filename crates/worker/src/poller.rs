//! Periodic draining of the workflow action queue.

use std::sync::Arc;
use std::time::Duration;

use realty_db::repositories::WorkflowActionRepo;
use realty_workflow::{ActionExecutor, ActionProcessor, ProcessSummary, WorkflowError};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Scans for tenants with pending actions and processes each in turn.
pub struct ActionPoller {
    pool: PgPool,
    processor: ActionProcessor,
    interval: Duration,
}

impl ActionPoller {
    pub fn new(
        pool: PgPool,
        executor: Arc<dyn ActionExecutor>,
        interval: Duration,
        batch_size: i64,
    ) -> Self {
        Self {
            processor: ActionProcessor::new(pool.clone(), executor).with_batch_size(batch_size),
            pool,
            interval,
        }
    }

    /// Run until `cancel` is triggered. The first scan happens immediately.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Action poller started"
        );

        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Action poller stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(summary) if summary.total_processed > 0 => {
                            tracing::info!(
                                processed = summary.processed,
                                failed = summary.failed,
                                total = summary.total_processed,
                                "Action poller: scan complete",
                            );
                        }
                        Ok(_) => tracing::debug!("Action poller: queue empty"),
                        Err(e) => tracing::error!(error = %e, "Action poller: scan failed"),
                    }
                }
            }
        }
    }

    /// Process one batch for every tenant that has pending actions.
    ///
    /// A tenant whose batch cannot be loaded is logged and skipped.
    pub async fn poll_once(&self) -> Result<ProcessSummary, WorkflowError> {
        let tenants = WorkflowActionRepo::list_tenants_with_pending(&self.pool).await?;
        let mut total = ProcessSummary::default();

        for tenant_id in tenants {
            match self.processor.process_queued_actions(tenant_id).await {
                Ok(summary) => {
                    total.processed += summary.processed;
                    total.failed += summary.failed;
                    total.total_processed += summary.total_processed;
                }
                Err(e) => {
                    tracing::error!(tenant_id, error = %e, "Action poller: tenant batch failed");
                }
            }
        }
        Ok(total)
    }
}
