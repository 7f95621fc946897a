//! # Per-delivery retry workers.
//!
//! [`RetryScheduler`] runs one spawned worker per (event, subscription)
//! pair. The worker invokes the handler, and on failure sleeps on the
//! backoff policy before trying again, up to the configured ceiling.
//!
//! ## Rules
//! - Total invocations per delivery are bounded by `max_retries + 1`.
//! - A handler panic is caught and counted as a failed attempt; it never
//!   takes down the worker or the bus.
//! - Success records `handled.<topic>` exactly once (terminal success, not
//!   per attempt); exhaustion records `failed.<topic>` exactly once and
//!   emits exactly one [`Notice::EventFailed`].
//! - Backoff sleeps race against the bus-wide shutdown token, so shutdown
//!   ends pending retries without waiting out their delays.

use std::sync::Arc;

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::events::{Event, Notice, Notifier};
use crate::handlers::{Handle, HandlerRef};
use crate::metrics::{self, MetricsCollector};
use crate::policies::BackoffPolicy;
use crate::registry::SubscriptionId;

/// Spawns and supervises delivery workers.
#[derive(Clone)]
pub(crate) struct RetryScheduler {
    max_retries: u32,
    backoff: BackoffPolicy,
    shutdown: CancellationToken,
    metrics: Arc<MetricsCollector>,
    notifier: Arc<Notifier>,
}

impl RetryScheduler {
    pub(crate) fn new(
        max_retries: u32,
        backoff: BackoffPolicy,
        shutdown: CancellationToken,
        metrics: Arc<MetricsCollector>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            max_retries,
            backoff,
            shutdown,
            metrics,
            notifier,
        }
    }

    /// Starts one delivery worker for `(event, subscription)`.
    ///
    /// Returns immediately; the worker owns the retry loop from here.
    pub(crate) fn supervise(
        &self,
        event: Arc<Event>,
        subscription: SubscriptionId,
        handler: HandlerRef,
    ) {
        let this = self.clone();
        tokio::spawn(async move {
            this.deliver(event, subscription, handler).await;
        });
    }

    /// Retry loop for one delivery.
    async fn deliver(&self, event: Arc<Event>, subscription: SubscriptionId, handler: HandlerRef) {
        let mut attempts: u32 = 0;
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }
            attempts += 1;

            match invoke(handler.as_ref(), &event).await {
                Ok(()) => {
                    self.metrics.increment(&metrics::handled(&event.topic));
                    return;
                }
                Err(err) => {
                    if attempts > self.max_retries {
                        tracing::warn!(
                            topic = %event.topic,
                            handler = handler.name(),
                            subscription = %subscription,
                            attempts,
                            error = err.message(),
                            "delivery exhausted"
                        );
                        self.metrics.increment(&metrics::failed(&event.topic));
                        self.notifier.emit(&Notice::EventFailed {
                            event: Arc::clone(&event),
                            subscription,
                            error: err.message().to_string(),
                        });
                        return;
                    }

                    let delay = self.backoff.next(attempts - 1);
                    tracing::debug!(
                        topic = %event.topic,
                        handler = handler.name(),
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "retrying delivery after backoff"
                    );

                    let sleep = tokio::time::sleep(delay);
                    tokio::pin!(sleep);
                    tokio::select! {
                        _ = &mut sleep => {}
                        _ = self.shutdown.cancelled() => return,
                    }
                }
            }
        }
    }
}

/// Invokes the handler, converting panics into failed attempts.
async fn invoke(handler: &dyn Handle, event: &Event) -> Result<(), HandlerError> {
    match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let info = if let Some(s) = panic.downcast_ref::<&'static str>() {
                (*s).to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            Err(HandlerError::new(format!("handler panicked: {info}")))
        }
    }
}
