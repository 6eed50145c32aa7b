//! Cross-track event plumbing.
//!
//! Tracks react to each other (a selection in one highlights another)
//! without holding direct references: they subscribe to a shared bus and
//! keep the returned guard. Dropping the guard deregisters the callback,
//! so a destroyed track can never be called back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use log::debug;

/// A feature picked in some track, broadcast to every other track.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    /// Name of the track the selection happened in.
    pub source_track: String,
    pub start_index: u64,
    pub end_index: u64,
    pub feature_name: Option<String>,
}

type Callback<E> = Box<dyn FnMut(&E) + Send>;

struct Registry<E> {
    subscribers: HashMap<usize, Callback<E>>,
    next_id: usize,
}

/// Shared publish/subscribe bus for events of type `E`.
pub struct EventBus<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                subscribers: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a callback. The subscription lives exactly as long as the
    /// returned guard.
    pub fn subscribe(&self, callback: impl FnMut(&E) + Send + 'static) -> SubscriptionGuard<E> {
        let id = match self.registry.lock() {
            Ok(mut registry) => {
                let id = registry.next_id;
                registry.next_id += 1;
                registry.subscribers.insert(id, Box::new(callback));
                id
            }
            Err(_) => usize::MAX,
        };
        SubscriptionGuard {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every live subscriber.
    pub fn publish(&self, event: &E) {
        if let Ok(mut registry) = self.registry.lock() {
            for callback in registry.subscribers.values_mut() {
                callback(event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .map(|registry| registry.subscribers.len())
            .unwrap_or(0)
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Deregisters its subscription on drop.
pub struct SubscriptionGuard<E> {
    id: usize,
    registry: Weak<Mutex<Registry<E>>>,
}

impl<E> Drop for SubscriptionGuard<E> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade()
            && let Ok(mut registry) = registry.lock()
        {
            registry.subscribers.remove(&self.id);
            debug!("subscription {} removed", self.id);
        }
    }
}
