//! Handlers for the `/workflow/triggers` and `/workflow/events` resources.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use realty_core::types::DbId;
use realty_core::workflow_triggers::TriggerEvent;
use realty_db::models::workflow_trigger::{CreateWorkflowTrigger, UpdateWorkflowTrigger};
use serde_json::Value;

use crate::error::AppResult;
use crate::middleware::rbac::RequireWorkflowAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ── Trigger CRUD ─────────────────────────────────────────────────────

/// GET /api/v1/workflow/triggers?include_inactive=
pub async fn list_triggers(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let triggers = state
        .triggers()
        .get_triggers_by_tenant(user.tenant_id, params.include_inactive)
        .await?;
    Ok(Json(DataResponse { data: triggers }))
}

/// POST /api/v1/workflow/triggers
pub async fn create_trigger(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Json(input): Json<CreateWorkflowTrigger>,
) -> AppResult<impl IntoResponse> {
    let trigger = state.triggers().create_trigger(user.tenant_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: trigger })))
}

/// GET /api/v1/workflow/triggers/{id}
pub async fn get_trigger(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let trigger = state.triggers().get_trigger_by_id(id, user.tenant_id).await?;
    Ok(Json(DataResponse { data: trigger }))
}

/// PUT /api/v1/workflow/triggers/{id}
pub async fn update_trigger(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkflowTrigger>,
) -> AppResult<impl IntoResponse> {
    let trigger = state
        .triggers()
        .update_trigger(id, user.tenant_id, &input)
        .await?;
    Ok(Json(DataResponse { data: trigger }))
}

/// DELETE /api/v1/workflow/triggers/{id}
pub async fn delete_trigger(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.triggers().deactivate_trigger(id, user.tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Firing ───────────────────────────────────────────────────────────

/// POST /api/v1/workflow/triggers/{id}/execute
///
/// Fire one trigger with the request body as event data. Conditions are not
/// checked for manual firing.
pub async fn execute_trigger(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Path(id): Path<DbId>,
    Json(event_data): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let execution = state
        .triggers()
        .execute_trigger(id, user.tenant_id, &event_data)
        .await?;
    Ok(Json(DataResponse { data: execution }))
}

/// POST /api/v1/workflow/events/{event}
///
/// Fire every active trigger bound to `event` whose conditions match the body.
pub async fn fire_event(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Path(event): Path<String>,
    Json(event_data): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let event = TriggerEvent::from_str(&event)?;
    let executions = state
        .triggers()
        .execute_triggers_by_event(user.tenant_id, event, &event_data)
        .await?;
    Ok(Json(DataResponse { data: executions }))
}
