//! Handlers for the per-property workflow endpoints under `/properties/{id}`.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use realty_core::property_status::{is_valid_transition, PropertyStatus};
use realty_core::types::DbId;
use realty_core::workflow_rules::RuleEvaluation;
use realty_db::repositories::PropertyRepo;
use realty_workflow::{ChangeStatusRequest, WorkflowError};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusBody {
    pub status: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub metadata: Option<serde_json::Value>,
    /// Fire `status_change` triggers after the commit (default: true).
    #[serde(default = "default_execute_triggers")]
    pub execute_triggers: bool,
}

fn default_execute_triggers() -> bool {
    true
}

/// POST /api/v1/properties/{id}/status
///
/// Move the property to `status` as the authenticated user. The caller's role
/// is evaluated against the tenant's rules.
pub async fn change_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(property_id): Path<DbId>,
    Json(body): Json<ChangeStatusBody>,
) -> AppResult<impl IntoResponse> {
    let new_status = PropertyStatus::from_str(&body.status)?;
    let request = ChangeStatusRequest {
        reason: body.reason,
        notes: body.notes,
        metadata: body.metadata,
        execute_triggers: body.execute_triggers,
        ..ChangeStatusRequest::new(property_id, user.tenant_id, new_status)
            .with_actor(user.user_id, user.role)
    };

    let outcome = state
        .property_workflow()
        .change_property_status(request)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/properties/{id}/workflow/initialize
///
/// Write the creation-time record. Repeated calls return the existing record.
pub async fn initialize(
    State(state): State<AppState>,
    user: AuthUser,
    Path(property_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .property_workflow()
        .initialize_property_workflow(property_id, user.tenant_id, Some(user.user_id))
        .await?;
    Ok(Json(DataResponse { data: record }))
}

/// GET /api/v1/properties/{id}/workflow
pub async fn get_state(
    State(state): State<AppState>,
    user: AuthUser,
    Path(property_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let current = state
        .property_workflow()
        .get_property_current_workflow_state(property_id, user.tenant_id)
        .await?;
    Ok(Json(DataResponse { data: current }))
}

/// GET /api/v1/properties/{id}/workflow/history
///
/// Audit records for the property, newest first.
pub async fn get_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(property_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let history = state
        .property_workflow()
        .get_property_workflow_history(property_id, user.tenant_id)
        .await?;
    Ok(Json(DataResponse { data: history }))
}

/// Request body for a dry-run evaluation.
#[derive(Debug, Deserialize)]
pub struct EvaluateBody {
    pub to_status: String,
    /// Defaults to the property's current status.
    pub from_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub from_status: PropertyStatus,
    pub to_status: PropertyStatus,
    /// Whether the state machine allows the move at all.
    pub structurally_valid: bool,
    pub evaluation: RuleEvaluation,
}

/// POST /api/v1/properties/{id}/workflow/evaluate
///
/// Evaluate the tenant's rules for a transition as the authenticated user,
/// without changing anything.
pub async fn evaluate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(property_id): Path<DbId>,
    Json(body): Json<EvaluateBody>,
) -> AppResult<impl IntoResponse> {
    let to_status = PropertyStatus::from_str(&body.to_status)?;
    let from_status = match body.from_status.as_deref() {
        Some(from) => PropertyStatus::from_str(from)?,
        None => {
            let property = PropertyRepo::find_by_id(&state.pool, property_id, user.tenant_id)
                .await?
                .ok_or(WorkflowError::NotFound {
                    entity: "Property",
                    id: property_id,
                })?;
            PropertyStatus::from_str(&property.status)?
        }
    };

    let evaluation = state
        .rules()
        .evaluate_rules_for_transition(
            property_id,
            user.tenant_id,
            from_status,
            to_status,
            Some(user.user_id),
            user.role,
        )
        .await?;

    Ok(Json(DataResponse {
        data: EvaluationResponse {
            from_status,
            to_status,
            structurally_valid: is_valid_transition(from_status, to_status),
            evaluation,
        },
    }))
}
