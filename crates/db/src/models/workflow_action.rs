//! Queued workflow action models.

use realty_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `workflow_actions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowAction {
    pub id: DbId,
    pub tenant_id: DbId,
    pub trigger_id: DbId,
    pub property_id: Option<DbId>,
    pub action_type: String,
    pub action_data: serde_json::Value,
    pub status: String,
    pub executed_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub created_at: Timestamp,
}

/// DTO for enqueuing an action. Actions always start `pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkflowAction {
    pub property_id: Option<DbId>,
    pub action_type: String,
    pub action_data: serde_json::Value,
}

/// Query parameters for listing actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
