//! Event Bus - broadcast of events to listeners and stream receivers

use super::types::{EventCategory, ShadowEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, trace};

// ============================================================================
// EventListener Trait
// ============================================================================

/// Event listener ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Implemented by components that react to events.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Listener name (for debugging)
    fn name(&self) -> &str;

    /// Categories of interest (`None` means all)
    fn categories(&self) -> Option<Vec<EventCategory>> {
        None
    }

    async fn on_event(&self, event: &ShadowEvent);
}

// ============================================================================
// EventBus
// ============================================================================

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast channel capacity
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Event bus
///
/// ```ignore
/// let bus = EventBus::new();
/// let id = bus.subscribe(Arc::new(my_listener)).await;
/// bus.publish(EventKind::NothingToCommit).await;
/// bus.unsubscribe(id).await;
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ShadowEvent>,

    listeners: RwLock<HashMap<ListenerId, Arc<dyn EventListener>>>,

    listener_counter: AtomicU64,

    event_count: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity);

        Self {
            sender,
            listeners: RwLock::new(HashMap::new()),
            listener_counter: AtomicU64::new(0),
            event_count: AtomicU64::new(0),
        }
    }

    /// Register a listener
    pub async fn subscribe(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.listener_counter.fetch_add(1, Ordering::SeqCst));

        debug!(
            listener_name = listener.name(),
            listener_id = %id,
            "Registering event listener"
        );

        self.listeners.write().await.insert(id, listener);
        id
    }

    /// Remove a listener
    pub async fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = self.listeners.write().await.remove(&id).is_some();
        if removed {
            debug!(listener_id = %id, "Unregistered event listener");
        }
        removed
    }

    /// Publish an event
    pub async fn publish(&self, event: impl Into<ShadowEvent>) {
        let event = event.into();
        self.event_count.fetch_add(1, Ordering::SeqCst);

        trace!(
            event_id = %event.id,
            event_type = event.event_type(),
            "Publishing event"
        );

        // No receivers is fine
        let _ = self.sender.send(event.clone());

        let listeners = self.listeners.read().await;
        for listener in listeners.values() {
            let interested = match listener.categories() {
                Some(cats) => cats.contains(&event.category()),
                None => true,
            };
            if interested {
                listener.on_event(&event).await;
            }
        }
    }

    /// Stream-style receiver; only sees events published after this call
    pub fn receiver(&self) -> broadcast::Receiver<ShadowEvent> {
        self.sender.subscribe()
    }

    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Total events published
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
