//! # Core handler trait.
//!
//! [`Handle`] is the extension point for plugging event consumers into the
//! bus. Each delivery runs in its own spawned task, so implementations may
//! be slow (I/O, batching) without blocking the publisher or other
//! subscribers.
//!
//! ## Contract
//! - Return `Ok(())` to acknowledge the event; the bus records
//!   `handled.<topic>` once per terminal success.
//! - Return `Err(HandlerError)` to request a retry; after the configured
//!   ceiling the bus emits an `event:failed` notice.
//! - Panics are caught and treated as failed attempts.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::events::Event;

/// Contract for asynchronous event handlers.
///
/// Called from a per-delivery worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use topicbus::{Event, Handle, HandlerError};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Handle for Audit {
///     async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
///         // write audit record...
///         let _ = event.id;
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "audit"
///     }
/// }
/// ```
#[async_trait]
pub trait Handle: Send + Sync + 'static {
    /// Handles a single event.
    ///
    /// The event is a read-only view; the bus retains ownership for the
    /// duration of the delivery (including retries).
    async fn handle(&self, event: &Event) -> Result<(), HandlerError>;

    /// Human-readable name (for logs and failure notices).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a handler, as stored by the subscription registry.
pub type HandlerRef = Arc<dyn Handle>;
