//! Handlers for the `/workflow/actions` queue.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use realty_db::models::workflow_action::ActionListQuery;
use realty_workflow::{ActionProcessor, EventBusActionExecutor};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireWorkflowAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/workflow/actions?status=&limit=&offset=
pub async fn list_actions(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Query(params): Query<ActionListQuery>,
) -> AppResult<impl IntoResponse> {
    let actions = processor(&state, None)
        .list_actions(user.tenant_id, &params)
        .await?;
    Ok(Json(DataResponse { data: actions }))
}

#[derive(Debug, Deserialize)]
pub struct ProcessParams {
    pub batch_size: Option<i64>,
}

/// POST /api/v1/workflow/actions/process?batch_size=
///
/// Execute the tenant's oldest pending actions by handing them to the bus's
/// action consumers. Without `batch_size`, the configured default is used.
pub async fn process_actions(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Query(params): Query<ProcessParams>,
) -> AppResult<impl IntoResponse> {
    let summary = processor(&state, params.batch_size)
        .process_queued_actions(user.tenant_id)
        .await?;
    Ok(Json(DataResponse { data: summary }))
}

fn processor(state: &AppState, batch_size: Option<i64>) -> ActionProcessor {
    let executor = Arc::new(EventBusActionExecutor::new(Arc::clone(&state.event_bus)));
    ActionProcessor::new(state.pool.clone(), executor)
        .with_batch_size(batch_size.unwrap_or(state.config.action_batch_size))
}
