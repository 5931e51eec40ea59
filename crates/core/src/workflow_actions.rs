//! Queued workflow action kinds and status lifecycle.
//!
//! Actions only move forward: `pending -> executed` on success, and
//! `pending -> failed` once a failing action exhausts its retries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Number of failed attempts after which an action is marked `failed`.
pub const MAX_ACTION_RETRIES: i32 = 3;

/// Default number of actions drained per processing pass.
pub const DEFAULT_ACTION_BATCH_SIZE: i64 = 100;

/// Upper bound on a processing pass batch size.
pub const MAX_ACTION_BATCH_SIZE: i64 = 1000;

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// The side effect a queued action asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    NotifyInterestedContacts,
    NotifyAgent,
    UpdateLeadStatus,
    SendEmail,
    CreateTask,
    /// An action type handled by an executor this crate does not know about.
    Custom(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotifyInterestedContacts => "notify_interested_contacts",
            Self::NotifyAgent => "notify_agent",
            Self::UpdateLeadStatus => "update_lead_status",
            Self::SendEmail => "send_email",
            Self::CreateTask => "create_task",
            Self::Custom(name) => name,
        }
    }

    /// Parse an action type. Unknown names become [`ActionKind::Custom`].
    pub fn parse(s: &str) -> Self {
        match s {
            "notify_interested_contacts" => Self::NotifyInterestedContacts,
            "notify_agent" => Self::NotifyAgent,
            "update_lead_status" => Self::UpdateLeadStatus,
            "send_email" => Self::SendEmail,
            "create_task" => Self::CreateTask,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a trigger's `actions` map into `(kind, config)` pairs.
///
/// The map must be a JSON object of at most
/// [`MAX_ACTIONS_PER_TRIGGER`](crate::workflow_triggers::MAX_ACTIONS_PER_TRIGGER)
/// entries. An empty map is allowed and enqueues nothing. Entry order follows
/// the object's key order.
pub fn parse_trigger_actions(value: &Value) -> Result<Vec<(ActionKind, Value)>, CoreError> {
    let map = value.as_object().ok_or_else(|| {
        CoreError::Validation(format!("Trigger actions must be a JSON object, got: {value}"))
    })?;

    let max = crate::workflow_triggers::MAX_ACTIONS_PER_TRIGGER;
    if map.len() > max {
        return Err(CoreError::Validation(format!(
            "Trigger actions exceed the maximum of {max} entries"
        )));
    }

    let mut actions = Vec::with_capacity(map.len());
    for (action_type, config) in map {
        if action_type.trim().is_empty() {
            return Err(CoreError::Validation(
                "Action type must not be empty".to_string(),
            ));
        }
        actions.push((ActionKind::parse(action_type), config.clone()));
    }
    Ok(actions)
}

// ---------------------------------------------------------------------------
// ActionStatus
// ---------------------------------------------------------------------------

/// Processing state of a queued action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Executed,
    Failed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executed => "executed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "executed" => Ok(Self::Executed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!(
                "Invalid action status: '{s}'. Must be one of: pending, executed, failed"
            ))),
        }
    }

    /// Whether the processor will never touch an action in this status again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status an action takes after a failed attempt, given its retry count
/// *after* the attempt has been counted.
pub fn status_after_failure(retry_count: i32) -> ActionStatus {
    if retry_count >= MAX_ACTION_RETRIES {
        ActionStatus::Failed
    } else {
        ActionStatus::Pending
    }
}

/// Clamp a requested batch size into `1..=MAX_ACTION_BATCH_SIZE`.
pub fn clamp_batch_size(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_ACTION_BATCH_SIZE)
        .clamp(1, MAX_ACTION_BATCH_SIZE)
}
