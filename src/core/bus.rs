//! # Event bus façade.
//!
//! [`EventBus`] owns the registry, metrics, notification channel, and retry
//! scheduler, and exposes the public publish/subscribe surface.
//!
//! ## Lifecycle
//! ```text
//! Uninitialized ──initialize()──► Ready ──shutdown()──► ShuttingDown ──► Stopped
//! ```
//! - `initialize` attaches schema validation if enabled; fails with a
//!   configuration error when validation is enabled but no schema source
//!   was provided at build time.
//! - `publish` fails with `NotReady` before `initialize` when validation is
//!   enabled, and always after `shutdown`.
//! - `shutdown` cancels pending retry timers (without waiting for their
//!   delays), releases all subscriptions and schema resources, and is
//!   idempotent. Registrations arriving after `shutdown` (`subscribe`,
//!   `subscribe_all`, `on`) are inert.
//!
//! ## Rules
//! - `publish` suspends only for validation and metric bookkeeping; handler
//!   execution and retries happen in independent spawned tasks.
//! - No process-wide singleton: each `EventBus` owns its own state, so
//!   multiple independent buses compose freely in one process.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::config::BusConfig;
use crate::error::BusError;
use crate::events::{Event, EventId, Notice, NoticeKind, Notifier};
use crate::handlers::HandlerRef;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::registry::{SubscriptionHandle, SubscriptionRegistry};

use super::builder::EventBusBuilder;
use super::dispatcher::Dispatcher;

/// Lifecycle states of a bus instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Ready,
    ShuttingDown,
    Stopped,
}

impl Lifecycle {
    fn name(self) -> &'static str {
        match self {
            Lifecycle::Uninitialized => "uninitialized",
            Lifecycle::Ready => "ready",
            Lifecycle::ShuttingDown => "shutting_down",
            Lifecycle::Stopped => "stopped",
        }
    }
}

/// In-process, topic-addressed publish/subscribe event bus.
///
/// Build with [`EventBus::builder`]; see the crate docs for the full
/// architecture.
pub struct EventBus {
    cfg: BusConfig,
    registry: Arc<SubscriptionRegistry>,
    metrics: Arc<MetricsCollector>,
    notifier: Arc<Notifier>,
    dispatcher: Dispatcher,
    shutdown_token: CancellationToken,
    schema_source_attached: bool,
    state: Mutex<Lifecycle>,
}

impl EventBus {
    /// Returns a builder for the given configuration.
    pub fn builder(cfg: BusConfig) -> EventBusBuilder {
        EventBusBuilder::new(cfg)
    }

    /// Builds a bus with the given configuration and no schema source.
    ///
    /// Shorthand for `EventBus::builder(cfg).build()`.
    pub fn new(cfg: BusConfig) -> Self {
        EventBusBuilder::new(cfg).build()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_internal(
        cfg: BusConfig,
        registry: Arc<SubscriptionRegistry>,
        metrics: Arc<MetricsCollector>,
        notifier: Arc<Notifier>,
        dispatcher: Dispatcher,
        shutdown_token: CancellationToken,
        schema_source_attached: bool,
    ) -> Self {
        Self {
            cfg,
            registry,
            metrics,
            notifier,
            dispatcher,
            shutdown_token,
            schema_source_attached,
            state: Mutex::new(Lifecycle::Uninitialized),
        }
    }

    /// Transitions the bus to `Ready`.
    ///
    /// Fails with [`BusError::Configuration`] when schema validation is
    /// enabled but no schema source was attached at build time, and with
    /// [`BusError::NotReady`] once the bus has been shut down. Calling
    /// `initialize` on an already-ready bus is a no-op.
    pub fn initialize(&self) -> Result<(), BusError> {
        let mut state = self.lock_state();
        match *state {
            Lifecycle::Uninitialized => {
                if self.cfg.validate_schemas && !self.schema_source_attached {
                    return Err(BusError::Configuration {
                        reason: "schema validation enabled but no schema source attached".into(),
                    });
                }
                *state = Lifecycle::Ready;
                Ok(())
            }
            Lifecycle::Ready => Ok(()),
            other => Err(BusError::NotReady { state: other.name() }),
        }
    }

    /// Publishes an event and returns once dispatch has been initiated for
    /// every matching subscriber.
    ///
    /// The returned id correlates any later `event:failed` notices with
    /// this publish call. Handler failures are never surfaced here — once
    /// dispatch starts, the call resolves successfully regardless of what
    /// handlers do afterwards.
    ///
    /// # Errors
    /// - [`BusError::InvalidTopic`] for an empty topic
    /// - [`BusError::SchemaValidation`] when validation is enabled, a schema
    ///   is registered for the topic, and the payload does not conform
    ///   (no handler runs, no metric is recorded)
    /// - [`BusError::NotReady`] outside the `Ready` state (see module docs
    ///   for the uninitialized/validation-disabled carve-out)
    pub async fn publish(
        &self,
        topic: &str,
        data: serde_json::Value,
        source: &str,
    ) -> Result<EventId, BusError> {
        self.ensure_publishable()?;
        let event = Event::new(topic, data, source)?;
        self.dispatcher.dispatch(event)
    }

    /// Subscribes a handler to an exact topic; returns the unsubscribe
    /// handle.
    ///
    /// After `shutdown` the handler is not recorded and the returned handle
    /// is inert.
    pub fn subscribe(&self, topic: &str, handler: HandlerRef) -> SubscriptionHandle {
        if self.is_shut_down() {
            return self.registry.inert_handle();
        }
        self.registry.add(topic, handler)
    }

    /// Subscribes a wildcard handler that receives every published event
    /// regardless of topic.
    ///
    /// After `shutdown` the handler is not recorded and the returned handle
    /// is inert.
    pub fn subscribe_all(&self, handler: HandlerRef) -> SubscriptionHandle {
        if self.is_shut_down() {
            return self.registry.inert_handle();
        }
        self.registry.add_wildcard(handler)
    }

    /// Registers a listener for bus-level notices of the given kind.
    ///
    /// Multiple listeners are allowed; they are called in registration
    /// order, synchronously on the emitting task. Registrations after
    /// `shutdown` are ignored.
    pub fn on<F>(&self, kind: NoticeKind, listener: F)
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        if self.is_shut_down() {
            return;
        }
        self.notifier.on(kind, Arc::new(listener));
    }

    /// Returns a point-in-time snapshot of the delivery counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Clears all counters; the next snapshot is an empty mapping.
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    /// Current lifecycle state name (for logs and diagnostics).
    pub fn lifecycle(&self) -> &'static str {
        self.lock_state().name()
    }

    /// Shuts the bus down.
    ///
    /// Cancels pending retry timers (already-sleeping retries end without
    /// firing), releases all subscriptions, notice listeners, and schema
    /// resources, then transitions to `Stopped`. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.lock_state();
            if matches!(*state, Lifecycle::ShuttingDown | Lifecycle::Stopped) {
                return;
            }
            *state = Lifecycle::ShuttingDown;
        }
        tracing::debug!(subscriptions = self.registry.len(), "bus shutting down");

        self.shutdown_token.cancel();
        self.registry.clear();
        self.notifier.clear();
        self.dispatcher.release_validator();

        *self.lock_state() = Lifecycle::Stopped;
        tracing::debug!("bus stopped");
    }

    /// Publish readiness per lifecycle state.
    ///
    /// `Uninitialized` is allowed through only when validation is disabled:
    /// with validation off the bus needs no external collaborators, so
    /// requiring an `initialize` call first would be ceremony.
    fn ensure_publishable(&self) -> Result<(), BusError> {
        let state = *self.lock_state();
        match state {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Uninitialized if !self.cfg.validate_schemas => Ok(()),
            other => Err(BusError::NotReady { state: other.name() }),
        }
    }

    fn is_shut_down(&self) -> bool {
        matches!(
            *self.lock_state(),
            Lifecycle::ShuttingDown | Lifecycle::Stopped
        )
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.state.lock().expect("lifecycle mutex poisoned")
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        // Stops any retry timers still sleeping when the bus goes away.
        self.shutdown_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::HandlerFn;
    use crate::policies::{BackoffPolicy, JitterPolicy};
    use crate::schema::StaticSchemaSource;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Config with fast retries so tests never wait on real backoff.
    fn fast_cfg() -> BusConfig {
        BusConfig {
            backoff: BackoffPolicy {
                first: Duration::from_millis(2),
                max: Duration::from_millis(10),
                factor: 1.0,
                jitter: JitterPolicy::None,
            },
            ..BusConfig::default()
        }
    }

    /// Handler that records every received topic on a channel.
    fn recording_handler(
        name: &'static str,
    ) -> (HandlerRef, mpsc::UnboundedReceiver<(String, String)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler = HandlerFn::arc(name, move |event: Event| {
            let tx = tx.clone();
            async move {
                tx.send((event.topic.clone(), event.source.clone())).unwrap();
                Ok(())
            }
        });
        (handler, rx)
    }

    #[tokio::test]
    async fn test_publish_delivers_to_direct_and_wildcard_exactly_once() {
        let bus = EventBus::new(fast_cfg());
        let (direct, mut direct_rx) = recording_handler("direct");
        let (wild, mut wild_rx) = recording_handler("wild");
        let (other, mut other_rx) = recording_handler("other");

        bus.subscribe("orders.created", direct);
        bus.subscribe_all(wild);
        bus.subscribe("orders.cancelled", other);

        bus.publish("orders.created", json!({"id": 42}), "api")
            .await
            .unwrap();

        assert_eq!(
            direct_rx.recv().await.unwrap(),
            ("orders.created".to_string(), "api".to_string())
        );
        assert_eq!(
            wild_rx.recv().await.unwrap(),
            ("orders.created".to_string(), "api".to_string())
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(direct_rx.try_recv().is_err(), "duplicate delivery");
        assert!(other_rx.try_recv().is_err(), "cross-topic delivery");
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_deliveries_and_is_idempotent() {
        let bus = EventBus::new(fast_cfg());
        let (handler, mut rx) = recording_handler("sub");
        let handle = bus.subscribe("t.a", handler);

        bus.publish("t.a", json!({}), "test").await.unwrap();
        rx.recv().await.unwrap();

        handle.unsubscribe();
        handle.unsubscribe(); // second call is a no-op

        bus.publish("t.a", json!({}), "test").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failing_handler_exhausts_retries_and_notifies_once() {
        let cfg = BusConfig {
            max_retries: 2,
            ..fast_cfg()
        };
        let bus = EventBus::new(cfg);

        let calls = Arc::new(AtomicU32::new(0));
        let counted = Arc::clone(&calls);
        bus.subscribe(
            "jobs.run",
            HandlerFn::arc("always-fails", move |_: Event| {
                let counted = Arc::clone(&counted);
                async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Err(HandlerError::new("boom"))
                }
            }),
        );

        let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
        bus.on(NoticeKind::EventFailed, move |notice| {
            notice_tx.send(notice.clone()).unwrap();
        });

        let id = bus.publish("jobs.run", json!({}), "test").await.unwrap();

        let notice = notice_rx.recv().await.unwrap();
        match notice {
            Notice::EventFailed { event, error, .. } => {
                assert_eq!(event.id, id);
                assert_eq!(error, "boom");
            }
        }

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3, "initial + 2 retries");
        assert!(notice_rx.try_recv().is_err(), "second notice");
        assert_eq!(bus.metrics().get("failed.jobs.run"), Some(&1));
    }

    #[tokio::test]
    async fn test_published_metrics_per_topic() {
        let bus = EventBus::new(fast_cfg());
        bus.publish("topic1", json!({}), "test").await.unwrap();
        bus.publish("topic2", json!({}), "test").await.unwrap();

        let snap = bus.metrics();
        assert_eq!(snap.get("published.total"), Some(&2));
        assert_eq!(snap.get("published.topic1"), Some(&1));
        assert_eq!(snap.get("published.topic2"), Some(&1));
    }

    #[tokio::test]
    async fn test_handled_increments_once_per_successful_delivery() {
        let bus = EventBus::new(fast_cfg());
        let (a, mut a_rx) = recording_handler("a");
        let (b, mut b_rx) = recording_handler("b");
        bus.subscribe("t", a);
        bus.subscribe("t", b);

        bus.publish("t", json!({}), "test").await.unwrap();
        a_rx.recv().await.unwrap();
        b_rx.recv().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Two subscribers, two terminal successes.
        assert_eq!(bus.metrics().get("handled.t"), Some(&2));
    }

    #[tokio::test]
    async fn test_reset_metrics_returns_empty_mapping() {
        let bus = EventBus::new(fast_cfg());
        bus.publish("t", json!({}), "test").await.unwrap();
        assert!(!bus.metrics().is_empty());

        bus.reset_metrics();
        assert!(bus.metrics().is_empty(), "leftover zero-valued keys");
    }

    #[tokio::test]
    async fn test_metrics_disabled_records_nothing() {
        let cfg = BusConfig {
            enable_metrics: false,
            ..fast_cfg()
        };
        let bus = EventBus::new(cfg);
        bus.publish("t", json!({}), "test").await.unwrap();
        assert!(bus.metrics().is_empty());
    }

    #[tokio::test]
    async fn test_schema_validation_rejects_before_handlers_and_metrics() {
        let source = StaticSchemaSource::new();
        source
            .register(
                "finance.monthly.summary.v1",
                &json!({"type": "object", "required": ["month", "totals"]}),
            )
            .unwrap();

        let cfg = BusConfig {
            validate_schemas: true,
            ..fast_cfg()
        };
        let bus = EventBus::builder(cfg)
            .with_schema_source(Arc::new(source))
            .build();
        bus.initialize().unwrap();

        let (handler, mut rx) = recording_handler("summary");
        bus.subscribe("finance.monthly.summary.v1", handler);

        let err = bus
            .publish(
                "finance.monthly.summary.v1",
                json!({"unexpected": true}),
                "reports",
            )
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "schema_validation");

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(rx.try_recv().is_err(), "handler ran on invalid payload");
        assert!(bus.metrics().is_empty(), "metrics recorded on rejection");

        // A conforming payload dispatches normally.
        bus.publish(
            "finance.monthly.summary.v1",
            json!({"month": "2024-01", "totals": {"net": 10}}),
            "reports",
        )
        .await
        .unwrap();
        rx.recv().await.unwrap();
        assert_eq!(bus.metrics().get("published.total"), Some(&1));
    }

    #[tokio::test]
    async fn test_unregistered_topic_passes_validation() {
        let cfg = BusConfig {
            validate_schemas: true,
            ..fast_cfg()
        };
        let bus = EventBus::builder(cfg)
            .with_schema_source(Arc::new(StaticSchemaSource::new()))
            .build();
        bus.initialize().unwrap();

        // No schema registered for this topic: permissive pass.
        bus.publish("free.form", json!({"anything": "goes"}), "test")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_initialize_requires_schema_source_when_validating() {
        let cfg = BusConfig {
            validate_schemas: true,
            ..fast_cfg()
        };
        let bus = EventBus::new(cfg);
        let err = bus.initialize().unwrap_err();
        assert_eq!(err.as_label(), "configuration");

        // And publishing without initialize is a readiness error.
        let err = bus.publish("t", json!({}), "test").await.unwrap_err();
        assert_eq!(err.as_label(), "not_ready");
    }

    #[tokio::test]
    async fn test_publish_without_initialize_is_allowed_when_not_validating() {
        let bus = EventBus::new(fast_cfg());
        assert_eq!(bus.lifecycle(), "uninitialized");
        bus.publish("t", json!({}), "test").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_topic_is_rejected() {
        let bus = EventBus::new(fast_cfg());
        let err = bus.publish("", json!({}), "test").await.unwrap_err();
        assert_eq!(err.as_label(), "invalid_topic");
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent_and_blocks_publish() {
        let bus = EventBus::new(fast_cfg());
        bus.initialize().unwrap();
        let (handler, _rx) = recording_handler("sub");
        bus.subscribe("t", handler);

        bus.shutdown();
        bus.shutdown();
        assert_eq!(bus.lifecycle(), "stopped");

        let err = bus.publish("t", json!({}), "test").await.unwrap_err();
        assert_eq!(err.as_label(), "not_ready");
    }

    #[tokio::test]
    async fn test_hanging_handler_does_not_delay_publish_or_other_handlers() {
        let bus = EventBus::new(fast_cfg());
        bus.subscribe(
            "t",
            HandlerFn::arc("hangs", |_: Event| async {
                std::future::pending::<()>().await;
                Ok(())
            }),
        );
        let (handler, mut rx) = recording_handler("prompt");
        bus.subscribe("t", handler);

        // One subscriber never completes; publish must still resolve.
        tokio::time::timeout(
            Duration::from_secs(1),
            bus.publish("t", json!({}), "test"),
        )
        .await
        .expect("publish blocked on a hanging handler")
        .unwrap();

        // And the other subscriber still gets its delivery.
        rx.recv().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(bus.metrics().get("handled.t"), Some(&1));
    }

    #[tokio::test]
    async fn test_registrations_after_shutdown_are_inert() {
        let bus = EventBus::new(fast_cfg());
        bus.initialize().unwrap();
        bus.shutdown();

        let (handler, _rx) = recording_handler("late");
        let direct = bus.subscribe("t", Arc::clone(&handler));
        let wild = bus.subscribe_all(handler);
        bus.on(NoticeKind::EventFailed, |_| {
            panic!("listener registered after shutdown");
        });

        assert_eq!(bus.registry.len(), 0, "post-shutdown subscription recorded");
        assert_ne!(direct.id(), wild.id(), "inert handles must keep unique ids");

        // Unsubscribing an inert handle is a no-op.
        direct.unsubscribe();
        wild.unsubscribe();
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_retries() {
        let cfg = BusConfig {
            max_retries: 3,
            backoff: BackoffPolicy {
                first: Duration::from_secs(60),
                max: Duration::from_secs(60),
                factor: 1.0,
                jitter: JitterPolicy::None,
            },
            ..BusConfig::default()
        };
        let bus = EventBus::new(cfg);

        let calls = Arc::new(AtomicU32::new(0));
        let counted = Arc::clone(&calls);
        let (tx, mut rx) = mpsc::unbounded_channel();
        bus.subscribe(
            "t",
            HandlerFn::arc("fails", move |_: Event| {
                let counted = Arc::clone(&counted);
                let tx = tx.clone();
                async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    tx.send(()).unwrap();
                    Err(HandlerError::new("boom"))
                }
            }),
        );

        bus.publish("t", json!({}), "test").await.unwrap();
        rx.recv().await.unwrap();

        // The delivery worker is sleeping on a 60s backoff; shutdown must
        // end it without another invocation or a failure notice.
        bus.shutdown();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.metrics().get("failed.t"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishes_count_exactly() {
        let bus = Arc::new(EventBus::new(fast_cfg()));
        let mut joins = Vec::new();
        for _ in 0..50 {
            let bus = Arc::clone(&bus);
            joins.push(tokio::spawn(async move {
                bus.publish("hot.topic", json!({}), "test").await.unwrap();
            }));
        }
        for join in joins {
            join.await.unwrap();
        }

        let snap = bus.metrics();
        assert_eq!(snap.get("published.total"), Some(&50));
        assert_eq!(snap.get("published.hot.topic"), Some(&50));
    }

    #[tokio::test]
    async fn test_buses_are_independent() {
        let a = EventBus::new(fast_cfg());
        let b = EventBus::new(fast_cfg());

        let (handler, mut rx) = recording_handler("a-only");
        a.subscribe("t", handler);

        b.publish("t", json!({}), "test").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(rx.try_recv().is_err(), "delivery crossed bus instances");
        assert!(a.metrics().is_empty());
        assert_eq!(b.metrics().get("published.total"), Some(&1));
    }

    #[tokio::test]
    async fn test_failure_listeners_called_in_registration_order() {
        let cfg = BusConfig {
            max_retries: 0,
            ..fast_cfg()
        };
        let bus = EventBus::new(cfg);
        bus.subscribe(
            "t",
            HandlerFn::arc("fails", |_: Event| async { Err(HandlerError::new("boom")) }),
        );

        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            let done_tx = done_tx.clone();
            bus.on(NoticeKind::EventFailed, move |_| {
                order.lock().unwrap().push(tag);
                done_tx.send(()).unwrap();
            });
        }

        bus.publish("t", json!({}), "test").await.unwrap();
        done_rx.recv().await.unwrap();
        done_rx.recv().await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }
}
