//! Background consumer of the workflow action queue.
//!
//! The API only enqueues actions; this crate drains them on a fixed interval
//! for every tenant with pending work.

pub mod config;
pub mod poller;
