//! Event bus for the property workflow engine.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope, always tenant-scoped.
//! - [`EventLog`]: background subscriber that traces every published event.

pub mod bus;
pub mod log;

pub use bus::{EventBus, PlatformEvent};
pub use log::EventLog;

/// Event published after a property status transition commits.
pub const PROPERTY_STATUS_CHANGED: &str = "property.status_changed";

/// Event published after a property's creation-time record is written.
pub const PROPERTY_WORKFLOW_INITIALIZED: &str = "property.workflow_initialized";

/// Prefix for events emitted when a queued action is executed; the action type
/// is appended (`workflow.action.notify_agent`).
pub const WORKFLOW_ACTION_PREFIX: &str = "workflow.action.";
