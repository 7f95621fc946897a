//! # Simple tracing handler for debugging and demos.
//!
//! [`LogHandler`] emits one `tracing` event per delivery. Subscribe it as a
//! wildcard handler to see every event crossing the bus.
//!
//! Not intended for production use — implement a custom [`Handle`] for
//! application logging.

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;
use crate::handlers::Handle;

/// Wildcard-friendly handler that logs every received event.
///
/// Enabled via the `logging` feature.
pub struct LogHandler;

#[async_trait]
impl Handle for LogHandler {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        tracing::info!(
            topic = %event.topic,
            source = %event.source,
            event_id = %event.id,
            "event received"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
