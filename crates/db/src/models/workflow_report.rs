//! Read-only aggregation rows over the workflow audit log.

use realty_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Inclusive-exclusive time window for report queries. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportRange {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Transition count per target status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusTransitionCount {
    pub to_status: String,
    pub count: i64,
}

/// Transition count per acting user. `user_id = None` groups system transitions.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserActivityCount {
    pub user_id: Option<DbId>,
    pub count: i64,
}

/// Transition count per property.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PropertyTransitionCount {
    pub property_id: DbId,
    pub count: i64,
}

/// Transition count per `triggered_by` source.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TriggerSourceCount {
    pub triggered_by: String,
    pub count: i64,
}

/// Average time properties spent in a status before leaving it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusDwellTime {
    pub status: String,
    pub avg_hours: f64,
    pub sample_size: i64,
}

/// Queued action count per status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActionStatusCount {
    pub status: String,
    pub count: i64,
}
