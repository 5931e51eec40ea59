//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`PlatformEvent`]s, shared
//! via `Arc<EventBus>` between the HTTP layer and the workflow services.

use chrono::{DateTime, Utc};
use realty_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred inside one tenant.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor), and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"property.status_changed"`.
    pub event_type: String,

    /// Tenant the event belongs to. Subscribers must not cross tenants.
    pub tenant_id: DbId,

    /// Optional source entity kind (e.g. `"property"`, `"workflow_action"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that caused the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create a new event with only the required fields.
    pub fn new(event_type: impl Into<String>, tenant_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            tenant_id,
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user, if any.
    pub fn with_actor(mut self, user_id: Option<DbId>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Domain events go to every [`subscribe`](EventBus::subscribe) receiver.
/// Queued workflow actions additionally go to a separate consumer channel,
/// so passive listeners such as the event log never count as having handled
/// an action.
///
/// ```rust
/// use realty_events::bus::{EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new("property.status_changed", 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
    action_sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        let (action_sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            action_sender,
        }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it; `0` means the
    /// event was dropped.
    pub fn publish(&self, event: PlatformEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Hand a workflow action to its consumers.
    ///
    /// Returns the number of action consumers that received it. The event is
    /// also published on the general channel, which does not count towards
    /// the result.
    pub fn publish_action(&self, event: PlatformEvent) -> usize {
        let delivered = self.action_sender.send(event.clone()).unwrap_or(0);
        self.publish(event);
        delivered
    }

    /// Register as a consumer of workflow actions.
    pub fn subscribe_actions(&self) -> broadcast::Receiver<PlatformEvent> {
        self.action_sender.subscribe()
    }

    /// Number of live action consumers.
    pub fn action_consumer_count(&self) -> usize {
        self.action_sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
