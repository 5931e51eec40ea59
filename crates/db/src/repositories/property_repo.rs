//! Repository for the `properties` table.

use realty_core::types::DbId;
use sqlx::PgPool;

use crate::models::property::{CreateProperty, Property};
use crate::models::workflow_history::{CreateWorkflowHistory, WorkflowHistory};
use crate::repositories::workflow_history_repo::HISTORY_COLUMNS;

/// Column list for `properties` queries.
const COLUMNS: &str = "id, tenant_id, title, status, price, created_at, updated_at";

/// Provides the property reads and the guarded status write used by the
/// workflow engine.
pub struct PropertyRepo;

impl PropertyRepo {
    /// Insert a new property, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProperty) -> Result<Property, sqlx::Error> {
        let query = format!(
            "INSERT INTO properties (tenant_id, title, status, price)
             VALUES ($1, $2, COALESCE($3, 'draft'), $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(input.tenant_id)
            .bind(&input.title)
            .bind(&input.status)
            .bind(input.price)
            .fetch_one(pool)
            .await
    }

    /// Find a property by id, scoped to its tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        tenant_id: DbId,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Move a property to `history.to_status` and append its audit record,
    /// atomically.
    ///
    /// The update only applies while the stored status still equals
    /// `expected_status` (compare-and-swap). Returns `None` without writing
    /// anything when another writer got there first.
    pub async fn transition_status(
        pool: &PgPool,
        expected_status: &str,
        history: &CreateWorkflowHistory,
    ) -> Result<Option<(Property, WorkflowHistory)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE properties SET status = $4
             WHERE id = $1 AND tenant_id = $2 AND status = $3
             RETURNING {COLUMNS}"
        );
        let property = sqlx::query_as::<_, Property>(&update)
            .bind(history.property_id)
            .bind(history.tenant_id)
            .bind(expected_status)
            .bind(&history.to_status)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(property) = property else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert = format!(
            "INSERT INTO property_workflow_history
                (tenant_id, property_id, from_status, to_status, user_id, reason, notes,
                 metadata, triggered_by, trigger_data)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {HISTORY_COLUMNS}"
        );
        let record = sqlx::query_as::<_, WorkflowHistory>(&insert)
            .bind(history.tenant_id)
            .bind(history.property_id)
            .bind(&history.from_status)
            .bind(&history.to_status)
            .bind(history.user_id)
            .bind(&history.reason)
            .bind(&history.notes)
            .bind(&history.metadata)
            .bind(&history.triggered_by)
            .bind(&history.trigger_data)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((property, record)))
    }
}
