//! # Bus-level notification channel.
//!
//! The bus reports its own conditions — today, permanent delivery failures —
//! through a typed notification channel, separate from event delivery
//! itself. Consumers register listeners per [`NoticeKind`] via
//! [`EventBus::on`](crate::EventBus::on); listeners for a kind are called in
//! registration order.
//!
//! ## Architecture
//! ```text
//! RetryScheduler ── exhausted ──► Notifier::emit(Notice::EventFailed { .. })
//!                                       │
//!                                       ├──► listener 1 (registration order)
//!                                       ├──► listener 2
//!                                       └──► listener N
//! ```
//!
//! ## Rules
//! - Exactly one `EventFailed` notice per exhausted (event, subscription) pair.
//! - Listeners run synchronously on the emitting task; keep them cheap
//!   (hand off to a channel for heavy work).
//! - Listeners are invoked on a snapshot taken outside the listener map
//!   lock, so a listener may register further listeners without
//!   deadlocking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::events::Event;
use crate::registry::SubscriptionId;

/// Classification of bus-level notices.
///
/// The set is explicit so that listener registration is typed; future kinds
/// extend this enum rather than introducing string-keyed channels.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// A handler exhausted its retries for an event; the delivery is
    /// permanently failed.
    EventFailed,
}

/// Payload of a bus-level notice.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Notice {
    /// Terminal delivery failure for one (event, subscription) pair.
    EventFailed {
        /// The event whose delivery failed.
        event: Arc<Event>,
        /// Subscription whose handler exhausted its retries.
        subscription: SubscriptionId,
        /// Message of the last handler error.
        error: String,
    },
}

impl Notice {
    /// Returns the kind used for listener routing.
    pub fn kind(&self) -> NoticeKind {
        match self {
            Notice::EventFailed { .. } => NoticeKind::EventFailed,
        }
    }
}

/// Callback registered for a notice kind.
pub type NoticeListener = Arc<dyn Fn(&Notice) + Send + Sync>;

/// Mapping from notice kind to ordered listener list.
///
/// Shared between the façade (registration) and the retry scheduler
/// (emission). Guarded by a single mutex; listener invocation happens on a
/// snapshot taken outside the lock.
#[derive(Default)]
pub(crate) struct Notifier {
    listeners: Mutex<HashMap<NoticeKind, Vec<NoticeListener>>>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a listener for `kind`, preserving registration order.
    pub(crate) fn on(&self, kind: NoticeKind, listener: NoticeListener) {
        let mut listeners = self.listeners.lock().expect("notifier mutex poisoned");
        listeners.entry(kind).or_default().push(listener);
    }

    /// Calls every listener registered for the notice's kind, in order.
    pub(crate) fn emit(&self, notice: &Notice) {
        let snapshot: Vec<NoticeListener> = {
            let listeners = self.listeners.lock().expect("notifier mutex poisoned");
            listeners.get(&notice.kind()).cloned().unwrap_or_default()
        };
        for listener in snapshot {
            listener(notice);
        }
    }

    /// Drops all registered listeners (used at shutdown).
    pub(crate) fn clear(&self) {
        self.listeners
            .lock()
            .expect("notifier mutex poisoned")
            .clear();
    }
}
