//! Repository for the `property_workflow_history` table.
//!
//! Append-only: there are no update or delete methods, and the table rejects
//! updates at the database level.

use realty_core::types::DbId;
use sqlx::PgPool;

use crate::models::workflow_history::{CreateWorkflowHistory, WorkflowHistory};

/// Column list for `property_workflow_history` queries.
pub(crate) const HISTORY_COLUMNS: &str = "id, tenant_id, property_id, from_status, to_status, \
    user_id, reason, notes, metadata, triggered_by, trigger_data, created_at";

/// Provides append and read operations for workflow history.
pub struct WorkflowHistoryRepo;

impl WorkflowHistoryRepo {
    /// Append a history record that is not paired with a status write
    /// (creation-time records).
    pub async fn create(
        pool: &PgPool,
        input: &CreateWorkflowHistory,
    ) -> Result<WorkflowHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO property_workflow_history
                (tenant_id, property_id, from_status, to_status, user_id, reason, notes,
                 metadata, triggered_by, trigger_data)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {HISTORY_COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowHistory>(&query)
            .bind(input.tenant_id)
            .bind(input.property_id)
            .bind(&input.from_status)
            .bind(&input.to_status)
            .bind(input.user_id)
            .bind(&input.reason)
            .bind(&input.notes)
            .bind(&input.metadata)
            .bind(&input.triggered_by)
            .bind(&input.trigger_data)
            .fetch_one(pool)
            .await
    }

    /// List a property's history, newest first.
    pub async fn list_for_property(
        pool: &PgPool,
        property_id: DbId,
        tenant_id: DbId,
    ) -> Result<Vec<WorkflowHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM property_workflow_history
             WHERE property_id = $1 AND tenant_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, WorkflowHistory>(&query)
            .bind(property_id)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// The oldest record for a property, if it has any history.
    pub async fn find_first_for_property(
        pool: &PgPool,
        property_id: DbId,
        tenant_id: DbId,
    ) -> Result<Option<WorkflowHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM property_workflow_history
             WHERE property_id = $1 AND tenant_id = $2
             ORDER BY created_at ASC, id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, WorkflowHistory>(&query)
            .bind(property_id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }
}
