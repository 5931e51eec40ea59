//! Repository layer.
//!
//! Each repository is a zero-sized struct with async methods that take
//! `&PgPool` as the first argument. Every read and write is scoped by tenant.

pub mod property_repo;
pub mod workflow_action_repo;
pub mod workflow_history_repo;
pub mod workflow_report_repo;
pub mod workflow_rule_repo;
pub mod workflow_trigger_repo;

pub use property_repo::PropertyRepo;
pub use workflow_action_repo::WorkflowActionRepo;
pub use workflow_history_repo::WorkflowHistoryRepo;
pub use workflow_report_repo::WorkflowReportRepo;
pub use workflow_rule_repo::WorkflowRuleRepo;
pub use workflow_trigger_repo::WorkflowTriggerRepo;
