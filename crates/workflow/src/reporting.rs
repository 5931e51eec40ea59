//! Read-only reports over the workflow audit log and action queue.

use realty_core::types::DbId;
use realty_db::models::workflow_report::{
    ActionStatusCount, PropertyTransitionCount, ReportRange, StatusDwellTime,
    StatusTransitionCount, TriggerSourceCount, UserActivityCount,
};
use realty_db::repositories::{WorkflowActionRepo, WorkflowReportRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::WorkflowError;

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub range: ReportWindow,
    pub total_transitions: i64,
    pub transitions_by_status: Vec<StatusTransitionCount>,
    pub user_activity: Vec<UserActivityCount>,
    pub most_active_properties: Vec<PropertyTransitionCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowMetrics {
    pub range: ReportWindow,
    pub average_time_in_status: Vec<StatusDwellTime>,
    pub transitions_by_source: Vec<TriggerSourceCount>,
    /// Current queue state; not limited to the window.
    pub action_queue: Vec<ActionStatusCount>,
}

/// Echo of the requested window.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReportWindow {
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&ReportRange> for ReportWindow {
    fn from(range: &ReportRange) -> Self {
        Self {
            from: range.from,
            to: range.to,
        }
    }
}

#[derive(Clone)]
pub struct WorkflowReportService {
    pool: PgPool,
}

impl WorkflowReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn generate_workflow_report(
        &self,
        tenant_id: DbId,
        range: &ReportRange,
    ) -> Result<WorkflowReport, WorkflowError> {
        validate_range(range)?;
        Ok(WorkflowReport {
            range: range.into(),
            total_transitions: WorkflowReportRepo::total_transitions(&self.pool, tenant_id, range)
                .await?,
            transitions_by_status: WorkflowReportRepo::counts_by_status(&self.pool, tenant_id, range)
                .await?,
            user_activity: WorkflowReportRepo::user_activity(&self.pool, tenant_id, range).await?,
            most_active_properties: WorkflowReportRepo::top_properties(&self.pool, tenant_id, range)
                .await?,
        })
    }

    pub async fn get_workflow_performance_metrics(
        &self,
        tenant_id: DbId,
        range: &ReportRange,
    ) -> Result<WorkflowMetrics, WorkflowError> {
        validate_range(range)?;
        Ok(WorkflowMetrics {
            range: range.into(),
            average_time_in_status: WorkflowReportRepo::dwell_times(&self.pool, tenant_id, range)
                .await?,
            transitions_by_source: WorkflowReportRepo::counts_by_trigger_source(
                &self.pool, tenant_id, range,
            )
            .await?,
            action_queue: WorkflowActionRepo::count_by_status(&self.pool, tenant_id).await?,
        })
    }
}

fn validate_range(range: &ReportRange) -> Result<(), WorkflowError> {
    match (range.from, range.to) {
        (Some(from), Some(to)) if from > to => Err(WorkflowError::Validation(
            "Report range 'from' must not be after 'to'".to_string(),
        )),
        _ => Ok(()),
    }
}
