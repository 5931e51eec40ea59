use std::sync::Arc;

use realty_events::EventBus;
use realty_workflow::{
    PropertyWorkflowService, WorkflowReportService, WorkflowRuleService, WorkflowTriggerService,
};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and bus are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: realty_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Committed transitions and executed actions are published here.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    pub fn property_workflow(&self) -> PropertyWorkflowService {
        PropertyWorkflowService::new(self.pool.clone()).with_event_bus(Arc::clone(&self.event_bus))
    }

    pub fn rules(&self) -> WorkflowRuleService {
        WorkflowRuleService::new(self.pool.clone())
    }

    pub fn triggers(&self) -> WorkflowTriggerService {
        WorkflowTriggerService::new(self.pool.clone())
    }

    pub fn reports(&self) -> WorkflowReportService {
        WorkflowReportService::new(self.pool.clone())
    }
}
