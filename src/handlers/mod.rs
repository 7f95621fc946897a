//! # Event handlers.
//!
//! This module provides the [`Handle`] trait, the [`HandlerFn`] closure
//! adapter, and (behind the `logging` feature) a built-in tracing handler.
//!
//! ## Delivery model
//! ```text
//! publish ──► Dispatcher ──► one spawned task per matching subscription
//!                                 │
//!                                 └─► handler.handle(&event)
//!                                       ├─ Ok  → handled.<topic> metric
//!                                       └─ Err → retry (bounded) → event:failed
//! ```
//!
//! Handlers on the same topic run concurrently and independently; a slow or
//! panicking handler never delays the others.

mod handler;
mod handler_fn;

#[cfg(feature = "logging")]
mod log;

pub use handler::{Handle, HandlerRef};
pub use handler_fn::HandlerFn;

#[cfg(feature = "logging")]
pub use log::LogHandler;
