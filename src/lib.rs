//! # topicbus
//!
//! **Topicbus** is an in-process, topic-addressed publish/subscribe event
//! bus for Rust.
//!
//! It decouples event producers from consumers within one process: handlers
//! subscribe to exact topics (or to everything), failed deliveries are
//! retried with configurable backoff, per-topic counters track delivery
//! outcomes, and payloads can optionally be validated against JSON Schemas
//! before dispatch. The crate is designed as a building block for services
//! that want event-driven wiring without an external broker.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  publish(topic, data, source)
//!            │
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventBus (façade + lifecycle)                                    │
//! │  - SubscriptionRegistry (topic → handlers, plus wildcard list)    │
//! │  - MetricsCollector (published/handled/failed counters)           │
//! │  - Notifier (typed notices, e.g. event:failed)                    │
//! │  - SchemaValidator (optional, via SchemaSource)                   │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌────────────┐    ┌────────────┐    ┌────────────┐
//!   │  delivery  │    │  delivery  │    │  delivery  │   one spawned
//!   │   worker   │    │   worker   │    │   worker   │   worker per
//!   │(retry loop)│    │(retry loop)│    │(retry loop)│   subscription
//!   └─────┬──────┘    └─────┬──────┘    └─────┬──────┘
//!         │ success: handled.<topic> += 1
//!         │ exhaustion: failed.<topic> += 1 and a Notice::EventFailed
//!         ▼
//!    Handle::handle(&event)
//! ```
//!
//! ### Delivery loop
//! ```text
//! publish ──► validate (opt) ──► count ──► handlers_for(topic)
//!
//! per subscription, in a spawned worker:
//! loop {
//!   ├─► attempt += 1
//!   ├─► handler.handle(&event)   (panics count as failures)
//!   │       │
//!   │       ├─ Ok  ──► handled.<topic> += 1, exit
//!   │       │
//!   │       └─ Err ──► attempt > max_retries?
//!   │                  ├─ yes ─► failed.<topic> += 1,
//!   │                  │         emit Notice::EventFailed, exit
//!   │                  └─ no  ─► sleep(backoff.next(..)) (cancellable)
//!   │                            and continue
//!   │
//!   └─ exit early when the bus shuts down
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                       |
//! |-------------------|-----------------------------------------------------------------|------------------------------------------|
//! | **Handler API**   | Subscribe async handlers to topics or to all events.            | [`Handle`], [`HandlerFn`], [`HandlerRef`]|
//! | **Policies**      | Configure retry backoff and jitter.                             | [`BackoffPolicy`], [`JitterPolicy`]      |
//! | **Bus**           | Publish events, manage subscriptions and lifecycle.             | [`EventBus`], [`EventBusBuilder`]        |
//! | **Errors**        | Typed errors for publishing and handler execution.              | [`BusError`], [`HandlerError`]           |
//! | **Notices**       | React to delivery exhaustion out of band.                       | [`Notice`], [`NoticeKind`]               |
//! | **Validation**    | Per-topic JSON Schema checks before dispatch.                   | [`SchemaSource`], [`StaticSchemaSource`] |
//! | **Metrics**       | Per-topic delivery counters, snapshot and reset.                | [`MetricsSnapshot`]                      |
//! | **Configuration** | Centralize bus settings.                                        | [`BusConfig`]                            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogHandler`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use topicbus::{BusConfig, Event, EventBus, HandlerFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new(BusConfig::default());
//!
//!     // Subscribe an async handler to a topic.
//!     let handle = bus.subscribe(
//!         "orders.created",
//!         HandlerFn::arc("print-order", |event: Event| async move {
//!             println!("order created: {}", event.data);
//!             Ok(())
//!         }),
//!     );
//!
//!     // Publish; resolves once dispatch has been initiated.
//!     let id = bus.publish("orders.created", json!({"id": 42}), "api").await?;
//!     println!("published event {id}");
//!
//!     handle.unsubscribe();
//!     bus.shutdown();
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod handlers;
mod metrics;
mod policies;
mod registry;
mod schema;

// ---- Public re-exports ----

pub use config::BusConfig;
pub use core::{EventBus, EventBusBuilder};
pub use error::{BusError, HandlerError};
pub use events::{Event, EventId, Notice, NoticeKind, NoticeListener};
pub use handlers::{Handle, HandlerFn, HandlerRef};
pub use metrics::MetricsSnapshot;
pub use policies::{BackoffPolicy, JitterPolicy};
pub use registry::{SubscriptionHandle, SubscriptionId};
pub use schema::{SchemaSource, StaticSchemaSource};

// Optional: expose a simple built-in logging handler (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use handlers::LogHandler;
