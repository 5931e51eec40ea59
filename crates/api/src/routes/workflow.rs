//! Route definitions for tenant workflow configuration, the action queue and
//! reporting.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{workflow_actions, workflow_reports, workflow_rules, workflow_triggers};
use crate::state::AppState;

/// Routes mounted at `/workflow`.
///
/// ```text
/// GET    /rules                   -> list_rules      (?include_inactive)
/// POST   /rules                   -> create_rule
/// GET    /rules/{id}              -> get_rule
/// PUT    /rules/{id}              -> update_rule
/// DELETE /rules/{id}              -> delete_rule
/// GET    /triggers                -> list_triggers   (?include_inactive)
/// POST   /triggers                -> create_trigger
/// GET    /triggers/{id}           -> get_trigger
/// PUT    /triggers/{id}           -> update_trigger
/// DELETE /triggers/{id}           -> delete_trigger
/// POST   /triggers/{id}/execute   -> execute_trigger
/// POST   /events/{event}          -> fire_event
/// GET    /actions                 -> list_actions    (?status, limit, offset)
/// POST   /actions/process         -> process_actions (?batch_size)
/// GET    /report                  -> get_report      (?from, to)
/// GET    /metrics                 -> get_metrics     (?from, to)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/rules",
            get(workflow_rules::list_rules).post(workflow_rules::create_rule),
        )
        .route(
            "/rules/{id}",
            get(workflow_rules::get_rule)
                .put(workflow_rules::update_rule)
                .delete(workflow_rules::delete_rule),
        )
        .route(
            "/triggers",
            get(workflow_triggers::list_triggers).post(workflow_triggers::create_trigger),
        )
        .route(
            "/triggers/{id}",
            get(workflow_triggers::get_trigger)
                .put(workflow_triggers::update_trigger)
                .delete(workflow_triggers::delete_trigger),
        )
        .route(
            "/triggers/{id}/execute",
            post(workflow_triggers::execute_trigger),
        )
        .route("/events/{event}", post(workflow_triggers::fire_event))
        .route("/actions", get(workflow_actions::list_actions))
        .route("/actions/process", post(workflow_actions::process_actions))
        .route("/report", get(workflow_reports::get_report))
        .route("/metrics", get(workflow_reports::get_metrics))
}
