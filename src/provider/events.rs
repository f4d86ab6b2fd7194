//! Listener bookkeeping for provider push notifications.
//!
//! # Responsibilities
//! - Hand out listener ids and channels for `on`
//! - Deliver emitted events to every listener of the matching kind
//! - Drop listeners on `remove_listener` or once their receiver is gone

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::provider::types::{EventKind, Listener, ListenerId, ProviderEvent};

/// Concurrent registry of event listeners, shared by provider implementations.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: DashMap<ListenerId, (EventKind, mpsc::UnboundedSender<ProviderEvent>)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind.
    pub fn register(&self, kind: EventKind) -> Listener {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.insert(id, (kind, tx));
        tracing::debug!(listener = id.0, event = kind.as_str(), "Listener registered");
        Listener { id, events: rx }
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id).is_some();
        if removed {
            tracing::debug!(listener = id.0, "Listener removed");
        }
        removed
    }

    /// Deliver an event to all listeners of its kind.
    ///
    /// Returns the number of listeners that received it.
    pub fn emit(&self, event: ProviderEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        let mut closed = Vec::new();

        for entry in self.listeners.iter() {
            let (listener_kind, tx) = entry.value();
            if *listener_kind != kind {
                continue;
            }
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*entry.key());
            }
        }

        // Removal must happen after the iterator's shard locks are released.
        for id in closed {
            self.listeners.remove(&id);
        }

        tracing::debug!(event = kind.as_str(), delivered, "Provider event emitted");
        delivered
    }

    /// Number of live listeners for an event kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.listeners.iter().filter(|e| e.value().0 == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
