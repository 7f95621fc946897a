//! # Schema lookup.
//!
//! Schema storage and loading is an external capability: the bus only asks,
//! per topic, for a compiled schema or "none registered". [`SchemaSource`]
//! is that seam; [`StaticSchemaSource`] is a ready-made in-memory
//! implementation for the common case of registering schemas up front.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::BusError;

/// Lookup capability consumed by the validator.
///
/// Implementations may be backed by files, a registry service, or anything
/// else; the bus treats "not found" as a permissive pass when validation is
/// enabled.
pub trait SchemaSource: Send + Sync + 'static {
    /// Returns the compiled schema registered for `topic`, if any.
    fn schema_for(&self, topic: &str) -> Option<Arc<jsonschema::Validator>>;
}

/// In-memory schema source.
///
/// Schemas are JSON Schema documents, compiled at registration time so that
/// a malformed schema fails fast (as a configuration error) rather than at
/// publish time.
///
/// # Example
/// ```
/// use serde_json::json;
/// use topicbus::StaticSchemaSource;
///
/// let source = StaticSchemaSource::new();
/// source
///     .register(
///         "finance.monthly.summary.v1",
///         &json!({
///             "type": "object",
///             "required": ["month", "totals"],
///         }),
///     )
///     .unwrap();
/// ```
#[derive(Default)]
pub struct StaticSchemaSource {
    schemas: Mutex<HashMap<String, Arc<jsonschema::Validator>>>,
}

impl StaticSchemaSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and registers a schema for `topic`, replacing any previous
    /// registration.
    ///
    /// Fails with [`BusError::Configuration`] if the document is not a valid
    /// JSON Schema.
    pub fn register(&self, topic: &str, schema: &serde_json::Value) -> Result<(), BusError> {
        let compiled = jsonschema::validator_for(schema).map_err(|err| BusError::Configuration {
            reason: format!("schema for topic {topic:?} failed to compile: {err}"),
        })?;
        self.schemas
            .lock()
            .expect("schema source mutex poisoned")
            .insert(topic.to_string(), Arc::new(compiled));
        Ok(())
    }
}

impl SchemaSource for StaticSchemaSource {
    fn schema_for(&self, topic: &str) -> Option<Arc<jsonschema::Validator>> {
        self.schemas
            .lock()
            .expect("schema source mutex poisoned")
            .get(topic)
            .cloned()
    }
}
