//! Pure domain logic for the property workflow engine.
//!
//! Nothing in this crate touches the database: the status graph, the role
//! hierarchy, rule conditions and their evaluator, and trigger/action
//! descriptors are all usable from the repository, service, and HTTP layers.

pub mod error;
pub mod property_status;
pub mod roles;
pub mod types;
pub mod workflow_actions;
pub mod workflow_history;
pub mod workflow_rules;
pub mod workflow_triggers;
