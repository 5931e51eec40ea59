//! Repository for the `workflow_actions` table.
//!
//! Status writes are guarded by `status = 'pending'`, so an action never moves
//! backwards and a second processor cannot overwrite a finished action.

use realty_core::types::DbId;
use realty_core::workflow_actions::{ActionStatus, MAX_ACTION_BATCH_SIZE};
use sqlx::PgPool;

use crate::models::workflow_action::{ActionListQuery, WorkflowAction};
use crate::models::workflow_report::ActionStatusCount;

/// Column list for `workflow_actions` queries.
pub(crate) const ACTION_COLUMNS: &str = "id, tenant_id, trigger_id, property_id, action_type, \
    action_data, status, executed_at, error_message, retry_count, created_at";

/// Default page size for action listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides queue operations for workflow actions.
pub struct WorkflowActionRepo;

impl WorkflowActionRepo {
    /// Find an action by id, scoped to its tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        tenant_id: DbId,
    ) -> Result<Option<WorkflowAction>, sqlx::Error> {
        let query = format!(
            "SELECT {ACTION_COLUMNS} FROM workflow_actions WHERE id = $1 AND tenant_id = $2"
        );
        sqlx::query_as::<_, WorkflowAction>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Oldest pending actions for a tenant, up to `limit`.
    pub async fn list_pending(
        pool: &PgPool,
        tenant_id: DbId,
        limit: i64,
    ) -> Result<Vec<WorkflowAction>, sqlx::Error> {
        let query = format!(
            "SELECT {ACTION_COLUMNS} FROM workflow_actions
             WHERE tenant_id = $1 AND status = $2
             ORDER BY created_at ASC, id ASC
             LIMIT $3"
        );
        sqlx::query_as::<_, WorkflowAction>(&query)
            .bind(tenant_id)
            .bind(ActionStatus::Pending.as_str())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List a tenant's actions, newest first, optionally filtered by status.
    pub async fn list_for_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        params: &ActionListQuery,
    ) -> Result<Vec<WorkflowAction>, sqlx::Error> {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_ACTION_BATCH_SIZE);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {ACTION_COLUMNS} FROM workflow_actions
             WHERE tenant_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, WorkflowAction>(&query)
            .bind(tenant_id)
            .bind(&params.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Tenants that currently have pending actions.
    pub async fn list_tenants_with_pending(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT DISTINCT tenant_id FROM workflow_actions WHERE status = $1 ORDER BY tenant_id",
        )
        .bind(ActionStatus::Pending.as_str())
        .fetch_all(pool)
        .await
    }

    /// Mark a pending action executed. Returns `false` if it was no longer
    /// pending.
    pub async fn mark_executed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workflow_actions
             SET status = $2, executed_at = NOW(), error_message = NULL
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(ActionStatus::Executed.as_str())
        .bind(ActionStatus::Pending.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a failed attempt on a pending action.
    ///
    /// Increments `retry_count` and stores the error. The action stays
    /// `pending` until its retry count reaches `max_retries`, then becomes
    /// `failed`. Returns `None` if the action was no longer pending.
    pub async fn record_failure(
        pool: &PgPool,
        id: DbId,
        error_message: &str,
        max_retries: i32,
    ) -> Result<Option<WorkflowAction>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_actions SET
                retry_count = retry_count + 1,
                error_message = $2,
                status = CASE WHEN retry_count + 1 >= $3 THEN $4 ELSE status END
             WHERE id = $1 AND status = $5
             RETURNING {ACTION_COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowAction>(&query)
            .bind(id)
            .bind(error_message)
            .bind(max_retries)
            .bind(ActionStatus::Failed.as_str())
            .bind(ActionStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Action counts per status for a tenant.
    pub async fn count_by_status(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Vec<ActionStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, ActionStatusCount>(
            "SELECT status, COUNT(*) AS count FROM workflow_actions
             WHERE tenant_id = $1
             GROUP BY status
             ORDER BY status",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
    }
}
