//! Workflow trigger events, trigger conditions, and event payloads.
//!
//! A trigger is bound to one [`TriggerEvent`]. When that event fires, every
//! active trigger whose conditions match the event payload enqueues one
//! action per entry of its `actions` map.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::CoreError;
use crate::property_status::PropertyStatus;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a trigger name.
pub const MAX_TRIGGER_NAME_LENGTH: usize = 200;

/// Maximum number of actions a single trigger may enqueue per firing.
pub const MAX_ACTIONS_PER_TRIGGER: usize = 20;

/// Stored condition key restricting the previous status.
pub const KEY_FROM_STATUS: &str = "fromStatus";

/// Stored condition key restricting the new status.
pub const KEY_TO_STATUS: &str = "toStatus";

// ---------------------------------------------------------------------------
// TriggerEvent
// ---------------------------------------------------------------------------

/// The event a trigger listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// A property changed status through the workflow engine.
    StatusChange,
    /// A property's workflow was initialised.
    PropertyCreated,
    /// Fired by an external scheduler.
    TimeBased,
    /// Fired explicitly by an operator.
    Manual,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusChange => "status_change",
            Self::PropertyCreated => "property_created",
            Self::TimeBased => "time_based",
            Self::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "status_change" => Ok(Self::StatusChange),
            "property_created" => Ok(Self::PropertyCreated),
            "time_based" => Ok(Self::TimeBased),
            "manual" => Ok(Self::Manual),
            _ => Err(CoreError::Validation(format!(
                "Invalid trigger_event: '{s}'. Must be one of: status_change, \
                 property_created, time_based, manual"
            ))),
        }
    }
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TriggerCondition
// ---------------------------------------------------------------------------

/// A filter deciding whether a trigger fires for a given event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// The event's previous status must be one of these.
    FromStatus { statuses: Vec<PropertyStatus> },
    /// The event's new status must be one of these.
    ToStatus { statuses: Vec<PropertyStatus> },
    /// Unrecognised condition; always matches.
    Custom { name: String, payload: Value },
}

/// Parse the `conditions` column of a workflow trigger.
///
/// Status filters accept a single status string or an array of them.
pub fn parse_trigger_conditions(value: &Value) -> Result<Vec<TriggerCondition>, CoreError> {
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(CoreError::Validation(format!(
                "Trigger conditions must be a JSON object, got: {other}"
            )))
        }
    };

    let mut conditions = Vec::with_capacity(map.len());
    for (name, payload) in map {
        let condition = match name.as_str() {
            KEY_FROM_STATUS => TriggerCondition::FromStatus {
                statuses: parse_status_list(payload, KEY_FROM_STATUS)?,
            },
            KEY_TO_STATUS => TriggerCondition::ToStatus {
                statuses: parse_status_list(payload, KEY_TO_STATUS)?,
            },
            _ => TriggerCondition::Custom {
                name: name.clone(),
                payload: payload.clone(),
            },
        };
        conditions.push(condition);
    }
    Ok(conditions)
}

fn parse_status_list(value: &Value, key: &str) -> Result<Vec<PropertyStatus>, CoreError> {
    match value {
        Value::String(s) => Ok(vec![PropertyStatus::from_str(s)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.as_str() {
                Some(s) => PropertyStatus::from_str(s),
                None => Err(CoreError::Validation(format!(
                    "{key} entries must be status strings, got: {item}"
                ))),
            })
            .collect(),
        other => Err(CoreError::Validation(format!(
            "{key} must be a status string or array of status strings, got: {other}"
        ))),
    }
}

/// Whether every condition matches the event payload.
///
/// Status conditions only match payloads that carry the corresponding status,
/// so a trigger filtered on `toStatus` never fires for non-transition events.
pub fn trigger_conditions_match(conditions: &[TriggerCondition], event_data: &Value) -> bool {
    conditions.iter().all(|condition| match condition {
        TriggerCondition::FromStatus { statuses } => {
            payload_status(event_data, KEY_FROM_STATUS).is_some_and(|s| statuses.contains(&s))
        }
        TriggerCondition::ToStatus { statuses } => {
            payload_status(event_data, KEY_TO_STATUS).is_some_and(|s| statuses.contains(&s))
        }
        TriggerCondition::Custom { .. } => true,
    })
}

fn payload_status(event_data: &Value, key: &str) -> Option<PropertyStatus> {
    event_data
        .get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| PropertyStatus::from_str(s).ok())
}

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

/// Payload describing one executed status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeEvent {
    pub property_id: DbId,
    pub from_status: Option<PropertyStatus>,
    pub to_status: PropertyStatus,
    pub user_id: Option<DbId>,
}

impl StatusChangeEvent {
    /// Serialize in the stored camelCase payload shape.
    pub fn to_json(&self) -> Value {
        json!({
            "propertyId": self.property_id,
            "fromStatus": self.from_status.map(|s| s.as_str()),
            "toStatus": self.to_status.as_str(),
            "userId": self.user_id,
        })
    }
}

/// Extract the property id carried by an event payload, if any.
pub fn event_property_id(event_data: &Value) -> Option<DbId> {
    event_data.get("propertyId").and_then(|v| v.as_i64())
}
