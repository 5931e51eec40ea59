//! Tracing subscriber for the event bus.
//!
//! [`EventLog`] runs as a long-lived background task and records every
//! [`PlatformEvent`] as a structured log line. It stops when the bus is
//! dropped.

use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

pub struct EventLog;

impl EventLog {
    /// Run the logging loop until the channel closes.
    pub async fn run(mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => Self::record(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event log lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event log shutting down");
                    break;
                }
            }
        }
    }

    fn record(event: &PlatformEvent) {
        tracing::info!(
            event_type = %event.event_type,
            tenant_id = event.tenant_id,
            source_entity_type = event.source_entity_type.as_deref(),
            source_entity_id = event.source_entity_id,
            actor_user_id = event.actor_user_id,
            "Platform event",
        );
    }
}
