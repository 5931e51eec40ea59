use realty_core::error::CoreError;
use realty_core::property_status::PropertyStatus;
use realty_core::roles::Role;
use realty_core::types::DbId;
use realty_core::workflow_rules::RuleEvaluation;

/// Errors raised by the workflow services.
///
/// Validation and rule failures are raised before any write, so a caller that
/// receives one of them can rely on the store being untouched.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("{message}")]
    InvalidTransition {
        from: PropertyStatus,
        to: PropertyStatus,
        message: String,
    },

    #[error(
        "Transition blocked by workflow rules: {}{}",
        rules.join(", "),
        required_role.map(|role| format!(" (requires role '{role}')")).unwrap_or_default()
    )]
    TransitionBlocked {
        rules: Vec<String>,
        required_role: Option<Role>,
        evaluation: RuleEvaluation,
    },

    #[error("Property {property_id} changed concurrently; expected status '{expected}'")]
    ConcurrentModification {
        property_id: DbId,
        expected: PropertyStatus,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl WorkflowError {
    pub(crate) fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<CoreError> for WorkflowError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            CoreError::Validation(msg) => Self::Validation(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for WorkflowError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
