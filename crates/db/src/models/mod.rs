//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where rows are mutable

pub mod property;
pub mod workflow_action;
pub mod workflow_history;
pub mod workflow_report;
pub mod workflow_rule;
pub mod workflow_trigger;
