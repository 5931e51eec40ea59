//! Property workflow engine.
//!
//! Orchestrates the status state machine over the repositories in
//! `realty-db`: structural checks and tenant rules before a transition, the
//! guarded status write plus its audit record, trigger dispatch into the
//! action queue afterwards, and processing of that queue.

pub mod actions;
pub mod error;
pub mod property_workflow;
pub mod reporting;
pub mod rules;
pub mod triggers;

pub use actions::{
    ActionError, ActionExecutor, ActionProcessor, EventBusActionExecutor, LoggingActionExecutor,
    ProcessSummary,
};
pub use error::WorkflowError;
pub use property_workflow::{
    ChangeStatusRequest, PropertyWorkflowService, PropertyWorkflowState, StatusChangeOutcome,
};
pub use reporting::{WorkflowMetrics, WorkflowReport, WorkflowReportService};
pub use rules::WorkflowRuleService;
pub use triggers::{TriggerExecution, WorkflowTriggerService};
