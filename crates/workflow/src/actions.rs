//! Processing of the workflow action queue.
//!
//! Actions are executed through an [`ActionExecutor`]. Each action is handled
//! on its own: a failure is counted and recorded on the row, and never stops
//! the rest of the batch.

use std::sync::Arc;

use async_trait::async_trait;
use realty_core::types::DbId;
use realty_core::workflow_actions::{
    clamp_batch_size, ActionKind, ActionStatus, MAX_ACTION_RETRIES,
};
use realty_db::models::workflow_action::{ActionListQuery, WorkflowAction};
use realty_db::repositories::WorkflowActionRepo;
use realty_events::{EventBus, PlatformEvent, WORKFLOW_ACTION_PREFIX};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::WorkflowError;

// ---------------------------------------------------------------------------
// Executors
// ---------------------------------------------------------------------------

/// Failure of a single action execution.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Action execution failed: {0}")]
    Failed(String),
}

/// Performs the side effect of one queued action.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, action: &WorkflowAction) -> Result<(), ActionError>;
}

/// Hands actions to downstream subsystems by publishing them as
/// `workflow.action.<type>` events on the bus's action channel.
///
/// Fails when no action consumer is registered, so the action stays queued
/// for a later attempt. General bus subscribers do not count.
pub struct EventBusActionExecutor {
    bus: Arc<EventBus>,
}

impl EventBusActionExecutor {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl ActionExecutor for EventBusActionExecutor {
    async fn execute(&self, action: &WorkflowAction) -> Result<(), ActionError> {
        let kind = ActionKind::parse(&action.action_type);
        let event = PlatformEvent::new(
            format!("{WORKFLOW_ACTION_PREFIX}{}", kind.as_str()),
            action.tenant_id,
        )
        .with_source("workflow_action", action.id)
        .with_payload(serde_json::json!({
            "actionId": action.id,
            "triggerId": action.trigger_id,
            "propertyId": action.property_id,
            "actionData": action.action_data,
        }));

        match self.bus.publish_action(event) {
            0 => Err(ActionError::Failed(format!(
                "no consumers for {WORKFLOW_ACTION_PREFIX}{kind}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Records actions in the log and reports success.
pub struct LoggingActionExecutor;

#[async_trait]
impl ActionExecutor for LoggingActionExecutor {
    async fn execute(&self, action: &WorkflowAction) -> Result<(), ActionError> {
        let kind = ActionKind::parse(&action.action_type);
        if let ActionKind::Custom(name) = &kind {
            tracing::warn!(action_id = action.id, action_type = %name, "Executing custom action type");
        }
        tracing::info!(
            action_id = action.id,
            tenant_id = action.tenant_id,
            property_id = action.property_id,
            action_type = %kind,
            data = %action.action_data,
            "Workflow action executed",
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Outcome counts of one processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub processed: usize,
    pub failed: usize,
    pub total_processed: usize,
}

#[derive(Clone)]
pub struct ActionProcessor {
    pool: PgPool,
    executor: Arc<dyn ActionExecutor>,
    batch_size: i64,
}

impl ActionProcessor {
    pub fn new(pool: PgPool, executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            pool,
            executor,
            batch_size: clamp_batch_size(None),
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = clamp_batch_size(Some(batch_size));
        self
    }

    /// Execute the oldest pending actions of a tenant, up to the batch size.
    ///
    /// Successful actions become `executed`. A failed action keeps `pending`
    /// with `retry_count` incremented until it has failed
    /// [`MAX_ACTION_RETRIES`] times, then becomes `failed`. Only store errors
    /// while loading the batch are returned.
    pub async fn process_queued_actions(
        &self,
        tenant_id: DbId,
    ) -> Result<ProcessSummary, WorkflowError> {
        let pending = WorkflowActionRepo::list_pending(&self.pool, tenant_id, self.batch_size).await?;
        let mut summary = ProcessSummary::default();

        for action in &pending {
            summary.total_processed += 1;
            let outcome = match self.executor.execute(action).await {
                Ok(()) => self.complete(action).await,
                Err(e) => Err(e.to_string()),
            };
            match outcome {
                Ok(()) => summary.processed += 1,
                Err(message) => {
                    summary.failed += 1;
                    self.record_failure(action, &message).await;
                }
            }
        }

        if summary.total_processed > 0 {
            tracing::info!(
                tenant_id,
                processed = summary.processed,
                failed = summary.failed,
                total = summary.total_processed,
                "Processed workflow actions",
            );
        }
        Ok(summary)
    }

    /// List a tenant's queued actions, newest first.
    pub async fn list_actions(
        &self,
        tenant_id: DbId,
        params: &ActionListQuery,
    ) -> Result<Vec<WorkflowAction>, WorkflowError> {
        if let Some(status) = &params.status {
            ActionStatus::from_str(status)?;
        }
        Ok(WorkflowActionRepo::list_for_tenant(&self.pool, tenant_id, params).await?)
    }

    async fn complete(&self, action: &WorkflowAction) -> Result<(), String> {
        match WorkflowActionRepo::mark_executed(&self.pool, action.id).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                // Already finished by another processor.
                tracing::debug!(action_id = action.id, "Action no longer pending");
                Ok(())
            }
            Err(e) => Err(format!("failed to mark executed: {e}")),
        }
    }

    async fn record_failure(&self, action: &WorkflowAction, message: &str) {
        match WorkflowActionRepo::record_failure(&self.pool, action.id, message, MAX_ACTION_RETRIES)
            .await
        {
            Ok(Some(updated)) => tracing::warn!(
                action_id = action.id,
                action_type = %action.action_type,
                retry_count = updated.retry_count,
                status = %updated.status,
                error = %message,
                "Workflow action failed",
            ),
            Ok(None) => {}
            Err(e) => tracing::error!(
                action_id = action.id,
                error = %e,
                "Failed to record workflow action failure",
            ),
        }
    }
}
