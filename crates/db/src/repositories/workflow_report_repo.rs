//! Read-only aggregations over `property_workflow_history`.
//!
//! Every query takes an optional `[from, to)` window. Unbounded ends are passed
//! as `NULL` and skipped in SQL.

use realty_core::types::DbId;
use sqlx::PgPool;

use crate::models::workflow_report::{
    PropertyTransitionCount, ReportRange, StatusDwellTime, StatusTransitionCount,
    TriggerSourceCount, UserActivityCount,
};

/// Shared tenant + time-window predicate; `$1` tenant, `$2` from, `$3` to.
const RANGE_FILTER: &str = "tenant_id = $1
    AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
    AND ($3::TIMESTAMPTZ IS NULL OR created_at < $3)";

/// Number of properties returned by [`WorkflowReportRepo::top_properties`].
pub const TOP_PROPERTIES_LIMIT: i64 = 10;

pub struct WorkflowReportRepo;

impl WorkflowReportRepo {
    /// Total history rows in the window.
    pub async fn total_transitions(
        pool: &PgPool,
        tenant_id: DbId,
        range: &ReportRange,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM property_workflow_history WHERE {RANGE_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(tenant_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_one(pool)
            .await
    }

    /// Transition counts grouped by target status, busiest first.
    pub async fn counts_by_status(
        pool: &PgPool,
        tenant_id: DbId,
        range: &ReportRange,
    ) -> Result<Vec<StatusTransitionCount>, sqlx::Error> {
        let query = format!(
            "SELECT to_status, COUNT(*) AS count
             FROM property_workflow_history
             WHERE {RANGE_FILTER}
             GROUP BY to_status
             ORDER BY count DESC, to_status ASC"
        );
        sqlx::query_as::<_, StatusTransitionCount>(&query)
            .bind(tenant_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(pool)
            .await
    }

    /// Transition counts grouped by acting user, busiest first.
    pub async fn user_activity(
        pool: &PgPool,
        tenant_id: DbId,
        range: &ReportRange,
    ) -> Result<Vec<UserActivityCount>, sqlx::Error> {
        let query = format!(
            "SELECT user_id, COUNT(*) AS count
             FROM property_workflow_history
             WHERE {RANGE_FILTER}
             GROUP BY user_id
             ORDER BY count DESC, user_id ASC NULLS LAST"
        );
        sqlx::query_as::<_, UserActivityCount>(&query)
            .bind(tenant_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(pool)
            .await
    }

    /// The most-transitioned properties, up to [`TOP_PROPERTIES_LIMIT`].
    pub async fn top_properties(
        pool: &PgPool,
        tenant_id: DbId,
        range: &ReportRange,
    ) -> Result<Vec<PropertyTransitionCount>, sqlx::Error> {
        let query = format!(
            "SELECT property_id, COUNT(*) AS count
             FROM property_workflow_history
             WHERE {RANGE_FILTER}
             GROUP BY property_id
             ORDER BY count DESC, property_id ASC
             LIMIT {TOP_PROPERTIES_LIMIT}"
        );
        sqlx::query_as::<_, PropertyTransitionCount>(&query)
            .bind(tenant_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(pool)
            .await
    }

    /// Transition counts grouped by `triggered_by`.
    pub async fn counts_by_trigger_source(
        pool: &PgPool,
        tenant_id: DbId,
        range: &ReportRange,
    ) -> Result<Vec<TriggerSourceCount>, sqlx::Error> {
        let query = format!(
            "SELECT triggered_by, COUNT(*) AS count
             FROM property_workflow_history
             WHERE {RANGE_FILTER}
             GROUP BY triggered_by
             ORDER BY triggered_by"
        );
        sqlx::query_as::<_, TriggerSourceCount>(&query)
            .bind(tenant_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(pool)
            .await
    }

    /// Average hours a property stayed in each status before its next
    /// transition.
    ///
    /// Pairs each history row with the next one for the same property; the
    /// latest row of each property (still in that status) is not sampled.
    /// The window applies to the moment the status was entered.
    pub async fn dwell_times(
        pool: &PgPool,
        tenant_id: DbId,
        range: &ReportRange,
    ) -> Result<Vec<StatusDwellTime>, sqlx::Error> {
        let query = format!(
            "WITH spans AS (
                SELECT to_status AS status,
                       created_at,
                       LEAD(created_at) OVER (
                           PARTITION BY property_id ORDER BY created_at, id
                       ) AS left_at
                FROM property_workflow_history
                WHERE tenant_id = $1
             )
             SELECT status,
                    (AVG(EXTRACT(EPOCH FROM (left_at - created_at))) / 3600.0)::FLOAT8
                        AS avg_hours,
                    COUNT(*) AS sample_size
             FROM spans
             WHERE left_at IS NOT NULL
               AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
               AND ($3::TIMESTAMPTZ IS NULL OR created_at < $3)
             GROUP BY status
             ORDER BY status"
        );
        sqlx::query_as::<_, StatusDwellTime>(&query)
            .bind(tenant_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(pool)
            .await
    }
}
