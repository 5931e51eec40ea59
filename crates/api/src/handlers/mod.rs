pub mod property_workflow;
pub mod workflow_actions;
pub mod workflow_reports;
pub mod workflow_rules;
pub mod workflow_triggers;
