//! Handlers for the `/workflow/rules` resource.
//!
//! Rules gate status transitions per tenant. Managing them requires
//! [`RequireWorkflowAdmin`]; deletion is a soft deactivation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use realty_core::types::DbId;
use realty_db::models::workflow_rule::{CreateWorkflowRule, UpdateWorkflowRule};

use crate::error::AppResult;
use crate::middleware::rbac::RequireWorkflowAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/workflow/rules?include_inactive=
pub async fn list_rules(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let rules = state
        .rules()
        .get_rules_by_tenant(user.tenant_id, params.include_inactive)
        .await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/workflow/rules
pub async fn create_rule(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Json(input): Json<CreateWorkflowRule>,
) -> AppResult<impl IntoResponse> {
    let rule = state.rules().create_rule(user.tenant_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// GET /api/v1/workflow/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rule = state.rules().get_rule_by_id(id, user.tenant_id).await?;
    Ok(Json(DataResponse { data: rule }))
}

/// PUT /api/v1/workflow/rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkflowRule>,
) -> AppResult<impl IntoResponse> {
    let rule = state.rules().update_rule(id, user.tenant_id, &input).await?;
    Ok(Json(DataResponse { data: rule }))
}

/// DELETE /api/v1/workflow/rules/{id}
///
/// Deactivates the rule. Returns 204 on success, 404 if not found.
pub async fn delete_rule(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.rules().deactivate_rule(id, user.tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
