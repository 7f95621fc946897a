//! Builder for wiring an [`EventBus`] and its collaborators.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::BusConfig;
use crate::events::Notifier;
use crate::metrics::MetricsCollector;
use crate::registry::SubscriptionRegistry;
use crate::schema::{SchemaSource, SchemaValidator};

use super::bus::EventBus;
use super::dispatcher::Dispatcher;
use super::retry::RetryScheduler;

/// Builder for constructing an [`EventBus`] with optional collaborators.
///
/// The built bus starts in the `Uninitialized` lifecycle state; call
/// [`EventBus::initialize`] before publishing when schema validation is
/// enabled.
pub struct EventBusBuilder {
    cfg: BusConfig,
    schema_source: Option<Arc<dyn SchemaSource>>,
}

impl EventBusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BusConfig) -> Self {
        Self {
            cfg,
            schema_source: None,
        }
    }

    /// Attaches the schema lookup capability.
    ///
    /// Required when `BusConfig::validate_schemas` is enabled; ignored by
    /// dispatch otherwise.
    pub fn with_schema_source(mut self, source: Arc<dyn SchemaSource>) -> Self {
        self.schema_source = Some(source);
        self
    }

    /// Builds the bus and wires all runtime components:
    /// - subscription registry
    /// - metrics collector (respecting `enable_metrics`)
    /// - notification channel
    /// - retry scheduler with a bus-wide shutdown token
    pub fn build(self) -> EventBus {
        let registry = SubscriptionRegistry::new();
        let metrics = Arc::new(MetricsCollector::new(self.cfg.enable_metrics));
        let notifier = Arc::new(Notifier::new());
        let shutdown = CancellationToken::new();

        let validator = if self.cfg.validate_schemas {
            self.schema_source
                .as_ref()
                .map(|source| SchemaValidator::new(Arc::clone(source)))
        } else {
            None
        };

        let retries = RetryScheduler::new(
            self.cfg.max_retries,
            self.cfg.backoff,
            shutdown.clone(),
            Arc::clone(&metrics),
            Arc::clone(&notifier),
        );
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&metrics),
            retries,
            validator,
        );

        EventBus::new_internal(
            self.cfg,
            registry,
            metrics,
            notifier,
            dispatcher,
            shutdown,
            self.schema_source.is_some(),
        )
    }
}
