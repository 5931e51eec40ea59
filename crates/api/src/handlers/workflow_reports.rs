//! Handlers for workflow reporting.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use realty_db::models::workflow_report::ReportRange;

use crate::error::AppResult;
use crate::middleware::rbac::RequireWorkflowAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/workflow/report?from=&to=
///
/// Bounds are RFC 3339 timestamps; either may be omitted.
pub async fn get_report(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Query(range): Query<ReportRange>,
) -> AppResult<impl IntoResponse> {
    let report = state
        .reports()
        .generate_workflow_report(user.tenant_id, &range)
        .await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/workflow/metrics?from=&to=
pub async fn get_metrics(
    State(state): State<AppState>,
    RequireWorkflowAdmin(user): RequireWorkflowAdmin,
    Query(range): Query<ReportRange>,
) -> AppResult<impl IntoResponse> {
    let metrics = state
        .reports()
        .get_workflow_performance_metrics(user.tenant_id, &range)
        .await?;
    Ok(Json(DataResponse { data: metrics }))
}
