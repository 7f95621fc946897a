//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(Event) -> Fut`, producing a fresh
//! future per invocation. This avoids shared mutable state between retries;
//! if shared state is needed, capture an `Arc<...>` explicitly inside the
//! closure.
//!
//! ## Example
//! ```rust
//! use topicbus::{Event, HandlerError, HandlerFn, HandlerRef};
//!
//! let h: HandlerRef = HandlerFn::arc("audit", |event: Event| async move {
//!     let _ = event.topic;
//!     Ok::<_, HandlerError>(())
//! });
//!
//! assert_eq!(h.name(), "audit");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;
use crate::handlers::handler::Handle;

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per invocation. The closure
/// receives its own clone of the event, so retries never observe partial
/// mutation from a previous attempt.
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a
    /// [`HandlerRef`](crate::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared `Arc`.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Handle for HandlerFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
