//! # Validation adapter.
//!
//! [`SchemaValidator`] sits between the dispatcher and a [`SchemaSource`]:
//! it looks up the topic's schema and checks the payload against it.
//!
//! ## Rules
//! - No schema registered for the topic ⇒ **pass**. The permissive default
//!   is deliberate and covered by tests, not an accidental fallthrough.
//! - Validation failure rejects the publish before any handler is invoked
//!   and before any `published.*` metric is recorded.

use std::sync::Arc;

use crate::error::BusError;
use crate::schema::source::SchemaSource;

/// Applies a topic's registered schema to a payload.
pub(crate) struct SchemaValidator {
    source: Arc<dyn SchemaSource>,
}

impl SchemaValidator {
    pub(crate) fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self { source }
    }

    /// Checks `data` against the schema registered for `topic`.
    ///
    /// Returns `Ok(())` when the payload conforms or when no schema is
    /// registered; otherwise a `SchemaValidation` error carrying every
    /// violation message.
    pub(crate) fn check(&self, topic: &str, data: &serde_json::Value) -> Result<(), BusError> {
        let Some(schema) = self.source.schema_for(topic) else {
            return Ok(());
        };

        let violations: Vec<String> = schema.iter_errors(data).map(|e| e.to_string()).collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(BusError::SchemaValidation {
                topic: topic.to_string(),
                violations,
            })
        }
    }
}
