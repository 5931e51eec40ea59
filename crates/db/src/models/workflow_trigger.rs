//! Workflow trigger models and DTOs.

use realty_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `workflow_triggers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowTrigger {
    pub id: DbId,
    pub tenant_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub trigger_event: String,
    pub conditions: serde_json::Value,
    /// Map of action type to action config.
    pub actions: serde_json::Value,
    pub is_active: bool,
    pub last_triggered: Option<Timestamp>,
    pub trigger_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a trigger. The tenant comes from the authenticated caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkflowTrigger {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub trigger_event: String,
    pub conditions: Option<serde_json::Value>,
    pub actions: serde_json::Value,
    pub is_active: Option<bool>,
}

/// DTO for updating a trigger. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkflowTrigger {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub trigger_event: Option<String>,
    pub conditions: Option<serde_json::Value>,
    pub actions: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}
