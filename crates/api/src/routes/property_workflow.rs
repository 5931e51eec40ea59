//! Route definitions for the per-property workflow endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::property_workflow;
use crate::state::AppState;

/// Routes mounted at `/properties`.
///
/// ```text
/// POST   /{id}/status                -> change_status
/// GET    /{id}/workflow              -> get_state
/// GET    /{id}/workflow/history      -> get_history
/// POST   /{id}/workflow/initialize   -> initialize
/// POST   /{id}/workflow/evaluate     -> evaluate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/status", post(property_workflow::change_status))
        .route("/{id}/workflow", get(property_workflow::get_state))
        .route("/{id}/workflow/history", get(property_workflow::get_history))
        .route(
            "/{id}/workflow/initialize",
            post(property_workflow::initialize),
        )
        .route("/{id}/workflow/evaluate", post(property_workflow::evaluate))
}
