pub mod health;
pub mod property_workflow;
pub mod workflow;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /properties/{id}/status                  change status (POST, any role)
/// /properties/{id}/workflow                current state (GET)
/// /properties/{id}/workflow/history        audit history, newest first (GET)
/// /properties/{id}/workflow/initialize     creation-time record (POST)
/// /properties/{id}/workflow/evaluate       dry-run rule evaluation (POST)
///
/// /workflow/rules                          list, create (tenant_admin+)
/// /workflow/rules/{id}                     get, update, deactivate
/// /workflow/triggers                       list, create (tenant_admin+)
/// /workflow/triggers/{id}                  get, update, deactivate
/// /workflow/triggers/{id}/execute          manual firing (POST)
/// /workflow/events/{event}                 fire triggers for an event (POST)
/// /workflow/actions                        list queue (?status, limit, offset)
/// /workflow/actions/process                drain pending actions (POST)
/// /workflow/report                         workflow report (?from, to)
/// /workflow/metrics                        performance metrics (?from, to)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/properties", property_workflow::router())
        .nest("/workflow", workflow::router())
}
