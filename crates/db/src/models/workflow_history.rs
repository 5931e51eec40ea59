//! Workflow history models.
//!
//! History rows are immutable once created (no `updated_at`, no update DTO).

use realty_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `property_workflow_history` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct WorkflowHistory {
    pub id: DbId,
    pub tenant_id: DbId,
    pub property_id: DbId,
    /// `None` for the creation-time record.
    pub from_status: Option<String>,
    pub to_status: String,
    /// `None` when the transition was system- or automation-driven.
    pub user_id: Option<DbId>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub metadata: serde_json::Value,
    pub triggered_by: String,
    pub trigger_data: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for appending a history record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkflowHistory {
    pub tenant_id: DbId,
    pub property_id: DbId,
    pub from_status: Option<String>,
    pub to_status: String,
    pub user_id: Option<DbId>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub metadata: serde_json::Value,
    pub triggered_by: String,
    pub trigger_data: serde_json::Value,
}
