//! Repository for the `workflow_rules` table.

use realty_core::types::DbId;
use realty_core::workflow_rules::DEFAULT_RULE_PRIORITY;
use sqlx::PgPool;

use crate::models::workflow_rule::{CreateWorkflowRule, UpdateWorkflowRule, WorkflowRule};

/// Column list for `workflow_rules` queries.
const COLUMNS: &str = "id, tenant_id, name, description, from_status, to_status, conditions, \
    required_role, is_active, priority, created_at, updated_at";

/// Provides CRUD operations for workflow rules.
pub struct WorkflowRuleRepo;

impl WorkflowRuleRepo {
    /// Insert a new rule for a tenant, returning the created row.
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        input: &CreateWorkflowRule,
    ) -> Result<WorkflowRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_rules
                (tenant_id, name, description, from_status, to_status, conditions,
                 required_role, is_active, priority)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, '{{}}'::jsonb), $7, COALESCE($8, true), $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowRule>(&query)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.from_status)
            .bind(&input.to_status)
            .bind(&input.conditions)
            .bind(&input.required_role)
            .bind(input.is_active)
            .bind(input.priority.unwrap_or(DEFAULT_RULE_PRIORITY))
            .fetch_one(pool)
            .await
    }

    /// Find a rule by id, scoped to its tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        tenant_id: DbId,
    ) -> Result<Option<WorkflowRule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM workflow_rules WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, WorkflowRule>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's rules ordered by priority, then id.
    pub async fn list_for_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<WorkflowRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_rules
             WHERE tenant_id = $1 AND ($2 OR is_active)
             ORDER BY priority ASC, id ASC"
        );
        sqlx::query_as::<_, WorkflowRule>(&query)
            .bind(tenant_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Active rules applying to `from -> to` for a tenant.
    ///
    /// A rule applies when its `from_status` is unset or equals `from`, and its
    /// `to_status` equals `to`. Ordered by ascending priority, then id.
    pub async fn list_for_transition(
        pool: &PgPool,
        tenant_id: DbId,
        from_status: &str,
        to_status: &str,
    ) -> Result<Vec<WorkflowRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_rules
             WHERE tenant_id = $1
               AND is_active
               AND (from_status IS NULL OR from_status = $2)
               AND to_status = $3
             ORDER BY priority ASC, id ASC"
        );
        sqlx::query_as::<_, WorkflowRule>(&query)
            .bind(tenant_id)
            .bind(from_status)
            .bind(to_status)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the rule does not exist for
    /// the tenant.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        tenant_id: DbId,
        input: &UpdateWorkflowRule,
    ) -> Result<Option<WorkflowRule>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_rules SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                from_status = COALESCE($5, from_status),
                to_status = COALESCE($6, to_status),
                conditions = COALESCE($7, conditions),
                required_role = COALESCE($8, required_role),
                is_active = COALESCE($9, is_active),
                priority = COALESCE($10, priority)
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowRule>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.from_status)
            .bind(&input.to_status)
            .bind(&input.conditions)
            .bind(&input.required_role)
            .bind(input.is_active)
            .bind(input.priority)
            .fetch_optional(pool)
            .await
    }

    /// Soft-disable a rule. Returns `true` if a row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId, tenant_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workflow_rules SET is_active = false WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
