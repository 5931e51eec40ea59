//! Repository for the `workflow_triggers` table.

use realty_core::types::DbId;
use sqlx::PgPool;

use crate::models::workflow_action::{CreateWorkflowAction, WorkflowAction};
use crate::models::workflow_trigger::{
    CreateWorkflowTrigger, UpdateWorkflowTrigger, WorkflowTrigger,
};
use crate::repositories::workflow_action_repo::ACTION_COLUMNS;

/// Column list for `workflow_triggers` queries.
const COLUMNS: &str = "id, tenant_id, name, description, trigger_event, conditions, actions, \
    is_active, last_triggered, trigger_count, created_at, updated_at";

/// Provides CRUD and execution bookkeeping for workflow triggers.
pub struct WorkflowTriggerRepo;

impl WorkflowTriggerRepo {
    /// Insert a new trigger for a tenant, returning the created row.
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        input: &CreateWorkflowTrigger,
    ) -> Result<WorkflowTrigger, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_triggers
                (tenant_id, name, description, trigger_event, conditions, actions, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, '{{}}'::jsonb), $6, COALESCE($7, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowTrigger>(&query)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.trigger_event)
            .bind(&input.conditions)
            .bind(&input.actions)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a trigger by id, scoped to its tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        tenant_id: DbId,
    ) -> Result<Option<WorkflowTrigger>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM workflow_triggers WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, WorkflowTrigger>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's triggers, newest first.
    pub async fn list_for_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<WorkflowTrigger>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_triggers
             WHERE tenant_id = $1 AND ($2 OR is_active)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, WorkflowTrigger>(&query)
            .bind(tenant_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Active triggers bound to an event for a tenant, oldest first.
    pub async fn list_active_for_event(
        pool: &PgPool,
        tenant_id: DbId,
        trigger_event: &str,
    ) -> Result<Vec<WorkflowTrigger>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_triggers
             WHERE tenant_id = $1 AND trigger_event = $2 AND is_active
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, WorkflowTrigger>(&query)
            .bind(tenant_id)
            .bind(trigger_event)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the trigger does not exist
    /// for the tenant.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        tenant_id: DbId,
        input: &UpdateWorkflowTrigger,
    ) -> Result<Option<WorkflowTrigger>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_triggers SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                trigger_event = COALESCE($5, trigger_event),
                conditions = COALESCE($6, conditions),
                actions = COALESCE($7, actions),
                is_active = COALESCE($8, is_active)
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowTrigger>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.trigger_event)
            .bind(&input.conditions)
            .bind(&input.actions)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-disable a trigger. Returns `true` if a row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId, tenant_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workflow_triggers SET is_active = false WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record one execution of a trigger and enqueue its actions, atomically.
    ///
    /// Increments `trigger_count` by exactly one and advances `last_triggered`
    /// (never backwards), then inserts every action as `pending`. Returns
    /// `None` if the trigger does not exist for the tenant.
    pub async fn record_execution(
        pool: &PgPool,
        id: DbId,
        tenant_id: DbId,
        actions: &[CreateWorkflowAction],
    ) -> Result<Option<(WorkflowTrigger, Vec<WorkflowAction>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE workflow_triggers SET
                trigger_count = trigger_count + 1,
                last_triggered = GREATEST(COALESCE(last_triggered, NOW()), NOW())
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        let trigger = sqlx::query_as::<_, WorkflowTrigger>(&update)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(trigger) = trigger else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert = format!(
            "INSERT INTO workflow_actions
                (tenant_id, trigger_id, property_id, action_type, action_data, status)
             VALUES ($1, $2, $3, $4, $5, 'pending')
             RETURNING {ACTION_COLUMNS}"
        );
        let mut created = Vec::with_capacity(actions.len());
        for action in actions {
            let row = sqlx::query_as::<_, WorkflowAction>(&insert)
                .bind(tenant_id)
                .bind(id)
                .bind(action.property_id)
                .bind(&action.action_type)
                .bind(&action.action_data)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(Some((trigger, created)))
    }
}
