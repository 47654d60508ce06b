//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`CacheEventBus`] carries [`CacheEvent`]s from the mutation controller to
//! background listeners such as the refetcher. It is designed to be shared
//! via `Arc<CacheEventBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasklists_core::types::{DbId, EntityKind};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// CacheEvent
// ---------------------------------------------------------------------------

/// Every cached query for an entity kind was marked stale.
pub const CACHE_INVALIDATED: &str = "cache.invalidated";

/// A mutation's remote call failed and its optimistic write was undone.
pub const MUTATION_ROLLED_BACK: &str = "mutation.rolled_back";

/// A mutation's remote call succeeded.
pub const MUTATION_CONFIRMED: &str = "mutation.confirmed";

/// Something that happened to the query cache.
///
/// Constructed via [`CacheEvent::new`] and enriched with
/// [`with_entity_id`](CacheEvent::with_entity_id) and
/// [`with_payload`](CacheEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEvent {
    /// Dot-separated event name, e.g. `"cache.invalidated"`.
    pub event_type: String,

    /// The entity kind whose cached queries are affected.
    pub entity: EntityKind,

    /// The record the triggering mutation targeted, when there is one.
    pub entity_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl CacheEvent {
    pub fn new(event_type: impl Into<String>, entity: EntityKind) -> Self {
        Self {
            event_type: event_type.into(),
            entity,
            entity_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a [`CACHE_INVALIDATED`] event.
    pub fn invalidated(entity: EntityKind) -> Self {
        Self::new(CACHE_INVALIDATED, entity)
    }

    pub fn with_entity_id(mut self, id: DbId) -> Self {
        self.entity_id = Some(id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn is_invalidation(&self) -> bool {
        self.event_type == CACHE_INVALIDATED
    }
}

// ---------------------------------------------------------------------------
// CacheEventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use tasklists_core::types::EntityKind;
/// use tasklists_events::bus::{CacheEvent, CacheEventBus};
///
/// let bus = CacheEventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(CacheEvent::invalidated(EntityKind::List));
/// ```
pub struct CacheEventBus {
    sender: broadcast::Sender<CacheEvent>,
}

impl CacheEventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: CacheEvent) {
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CacheEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
