//! Workflow rule models and DTOs.

use realty_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `workflow_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowRule {
    pub id: DbId,
    pub tenant_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub from_status: Option<String>,
    pub to_status: String,
    pub conditions: serde_json::Value,
    pub required_role: Option<String>,
    pub is_active: bool,
    pub priority: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a rule. The tenant comes from the authenticated caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkflowRule {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub from_status: Option<String>,
    pub to_status: String,
    pub conditions: Option<serde_json::Value>,
    pub required_role: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, max = 10000))]
    pub priority: Option<i32>,
}

/// DTO for updating a rule. All fields are optional.
///
/// `from_status` and `required_role` can only be replaced, not cleared; use a
/// new rule to widen a filter.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkflowRule {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub from_status: Option<String>,
    pub to_status: Option<String>,
    pub conditions: Option<serde_json::Value>,
    pub required_role: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, max = 10000))]
    pub priority: Option<i32>,
}
