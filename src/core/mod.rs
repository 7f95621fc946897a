//! # Core runtime.
//!
//! ## Contents
//! - [`EventBus`] public façade and lifecycle
//! - [`EventBusBuilder`] wiring of registry, metrics, notices, retries
//! - `Dispatcher` (crate-internal) validate → count → fan out
//! - `RetryScheduler` (crate-internal) per-delivery workers with backoff
//!
//! ## Flow
//! ```text
//! publish(topic, data, source)
//!    │
//!    ▼
//! Dispatcher ──► schema check ──► metrics ──► handlers_for(topic)
//!    │                                              │
//!    └── Ok(EventId) to the caller                  ▼
//!                                        RetryScheduler::supervise
//!                                        (one spawned worker per
//!                                         matching subscription)
//! ```

mod builder;
mod bus;
mod dispatcher;
mod retry;

pub use builder::EventBusBuilder;
pub use bus::EventBus;

pub(crate) use dispatcher::Dispatcher;
pub(crate) use retry::RetryScheduler;
