//! # Publish path.
//!
//! `Dispatcher` owns the synchronous half of a publish call:
//! validate (optional) → count → fan out to one retry worker per matching
//! subscription. Everything after fan-out happens in spawned workers, so
//! the publisher never observes handler latency or failures.

use std::sync::{Arc, Mutex};

use crate::error::BusError;
use crate::events::{Event, EventId};
use crate::metrics::{self, MetricsCollector};
use crate::registry::SubscriptionRegistry;
use crate::schema::SchemaValidator;

use super::retry::RetryScheduler;

pub(crate) struct Dispatcher {
    registry: Arc<SubscriptionRegistry>,
    metrics: Arc<MetricsCollector>,
    retries: RetryScheduler,
    validator: Mutex<Option<SchemaValidator>>,
}

impl Dispatcher {
    pub(crate) fn new(
        registry: Arc<SubscriptionRegistry>,
        metrics: Arc<MetricsCollector>,
        retries: RetryScheduler,
        validator: Option<SchemaValidator>,
    ) -> Self {
        Self {
            registry,
            metrics,
            retries,
            validator: Mutex::new(validator),
        }
    }

    /// Validates, counts, and fans the event out to every matching
    /// subscription.
    ///
    /// Validation failures reject the publish before any metric is recorded
    /// and before any handler is invoked. An event with zero subscribers is
    /// still a successful publish (and still counted).
    pub(crate) fn dispatch(&self, event: Event) -> Result<EventId, BusError> {
        {
            let validator = self.validator.lock().expect("validator mutex poisoned");
            if let Some(validator) = validator.as_ref() {
                validator.check(&event.topic, &event.data)?;
            }
        }

        self.metrics.increment(metrics::published_total());
        self.metrics.increment(&metrics::published(&event.topic));

        let subscribers = self.registry.handlers_for(&event.topic);
        tracing::debug!(
            topic = %event.topic,
            source = %event.source,
            event_id = %event.id,
            subscribers = subscribers.len(),
            "dispatching event"
        );

        let id = event.id;
        let event = Arc::new(event);
        for (subscription, handler) in subscribers {
            self.retries
                .supervise(Arc::clone(&event), subscription, handler);
        }
        Ok(id)
    }

    /// Drops the validator and the compiled schemas it holds (shutdown).
    pub(crate) fn release_validator(&self) {
        self.validator
            .lock()
            .expect("validator mutex poisoned")
            .take();
    }
}
