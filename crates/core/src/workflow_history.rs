//! Workflow audit trail vocabulary.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a transition reason.
pub const MAX_REASON_LENGTH: usize = 500;

/// Maximum length of free-text transition notes.
pub const MAX_NOTES_LENGTH: usize = 5000;

/// Who caused a recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggeredBy {
    /// A named user requested the transition.
    User,
    /// A workflow trigger or queued action caused it.
    Automation,
    /// No acting user (imports, maintenance, creation-time records).
    System,
}

impl TriggeredBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Automation => "automation",
            Self::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "user" => Ok(Self::User),
            "automation" => Ok(Self::Automation),
            "system" => Ok(Self::System),
            _ => Err(CoreError::Validation(format!(
                "Invalid triggered_by: '{s}'. Must be one of: user, automation, system"
            ))),
        }
    }

    /// `User` when an acting user is known, otherwise `System`.
    pub fn for_actor(user_id: Option<crate::types::DbId>) -> Self {
        if user_id.is_some() {
            Self::User
        } else {
            Self::System
        }
    }
}

impl std::fmt::Display for TriggeredBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate the free-text fields attached to a transition.
pub fn validate_transition_text(
    reason: Option<&str>,
    notes: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(reason) = reason {
        if reason.len() > MAX_REASON_LENGTH {
            return Err(CoreError::Validation(format!(
                "Reason exceeds maximum length of {MAX_REASON_LENGTH} characters"
            )));
        }
    }
    if let Some(notes) = notes {
        if notes.len() > MAX_NOTES_LENGTH {
            return Err(CoreError::Validation(format!(
                "Notes exceed maximum length of {MAX_NOTES_LENGTH} characters"
            )));
        }
    }
    Ok(())
}
