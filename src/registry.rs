//! # Subscription registry.
//!
//! Holds, per topic and for wildcard, the ordered list of active handlers.
//!
//! ## Rules
//! - `handlers_for(topic)` returns direct subscribers for the exact topic in
//!   subscribe order, followed by wildcard subscribers in subscribe order.
//!   This ordering holds per dispatch call; there is no cross-topic
//!   guarantee.
//! - No two subscriptions share an id, across topics and wildcard alike.
//! - Unsubscribing is idempotent: calling the handle more than once, or
//!   after the registry has been cleared, has no additional effect.
//!
//! The whole registry sits behind a single mutex; lookups clone the handler
//! `Arc`s out so dispatch never holds the lock while handlers run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::handlers::HandlerRef;

/// Unique identifier for one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Where a subscription lives inside the registry.
#[derive(Debug, Clone)]
enum Target {
    Topic(String),
    Wildcard,
}

struct Entry {
    id: SubscriptionId,
    handler: HandlerRef,
}

#[derive(Default)]
struct Inner {
    by_topic: HashMap<String, Vec<Entry>>,
    wildcard: Vec<Entry>,
    next_id: u64,
}

impl Inner {
    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Per-topic and wildcard handler lists.
///
/// Owned by the bus; a [`SubscriptionHandle`] returned at subscribe time
/// permits removal but carries no ownership of the handler.
#[derive(Default)]
pub struct SubscriptionRegistry {
    inner: Mutex<Inner>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds a handler for the exact `topic`; returns the unsubscribe handle.
    pub(crate) fn add(self: &Arc<Self>, topic: &str, handler: HandlerRef) -> SubscriptionHandle {
        let mut inner = self.lock();
        let id = inner.next_id();
        inner
            .by_topic
            .entry(topic.to_string())
            .or_default()
            .push(Entry { id, handler });
        self.handle_for(Target::Topic(topic.to_string()), id)
    }

    /// Adds a wildcard handler that receives every published event.
    pub(crate) fn add_wildcard(self: &Arc<Self>, handler: HandlerRef) -> SubscriptionHandle {
        let mut inner = self.lock();
        let id = inner.next_id();
        inner.wildcard.push(Entry { id, handler });
        self.handle_for(Target::Wildcard, id)
    }

    /// Allocates a fresh id without storing a handler.
    ///
    /// Used for registrations arriving after shutdown: the returned handle
    /// keeps the id-uniqueness guarantee but never resolves to an entry, so
    /// `unsubscribe` on it is a no-op.
    pub(crate) fn inert_handle(self: &Arc<Self>) -> SubscriptionHandle {
        let id = self.lock().next_id();
        SubscriptionHandle {
            registry: Weak::new(),
            target: Target::Wildcard,
            id,
        }
    }

    /// Resolves the subscriber list for one dispatch: direct subscribers in
    /// subscribe order, then wildcard subscribers in subscribe order.
    pub(crate) fn handlers_for(&self, topic: &str) -> Vec<(SubscriptionId, HandlerRef)> {
        let inner = self.lock();
        let direct = inner.by_topic.get(topic).into_iter().flatten();
        direct
            .chain(inner.wildcard.iter())
            .map(|e| (e.id, Arc::clone(&e.handler)))
            .collect()
    }

    /// Removes one subscription; missing entries are a no-op.
    fn remove(&self, target: &Target, id: SubscriptionId) {
        let mut inner = self.lock();
        match target {
            Target::Topic(topic) => {
                if let Some(entries) = inner.by_topic.get_mut(topic) {
                    entries.retain(|e| e.id != id);
                    if entries.is_empty() {
                        inner.by_topic.remove(topic);
                    }
                }
            }
            Target::Wildcard => inner.wildcard.retain(|e| e.id != id),
        }
    }

    /// Drops every subscription (used at shutdown).
    pub(crate) fn clear(&self) {
        let mut inner = self.lock();
        inner.by_topic.clear();
        inner.wildcard.clear();
    }

    /// Number of active subscriptions (direct + wildcard).
    pub(crate) fn len(&self) -> usize {
        let inner = self.lock();
        inner.by_topic.values().map(Vec::len).sum::<usize>() + inner.wildcard.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("registry mutex poisoned")
    }

    fn handle_for(self: &Arc<Self>, target: Target, id: SubscriptionId) -> SubscriptionHandle {
        SubscriptionHandle {
            registry: Arc::downgrade(self),
            target,
            id,
        }
    }
}

/// Removal handle returned at subscribe time.
///
/// Calling [`unsubscribe`](Self::unsubscribe) guarantees zero further
/// deliveries to the handler for subsequent publishes. The handle holds only
/// a weak reference to the registry, so keeping it alive does not keep the
/// bus alive.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    registry: Weak<SubscriptionRegistry>,
    target: Target,
    id: SubscriptionId,
}

impl SubscriptionHandle {
    /// The id of the subscription this handle controls.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the subscription.
    ///
    /// Safe to call multiple times, and safe after the bus has shut down;
    /// repeat calls have no additional effect.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.target, self.id);
        }
    }
}
