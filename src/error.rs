//! Error types used by the bus and by event handlers.
//!
//! This module defines two error layers:
//!
//! - [`BusError`] — publisher-facing errors raised synchronously by the bus
//!   (validation, readiness, configuration). These are the *only* errors a
//!   caller of `publish`/`initialize` ever sees.
//! - [`HandlerError`] — failures raised by individual handler invocations.
//!   These never propagate to the publisher; they are tracked per retry
//!   attempt and, on exhaustion, delivered via the `event:failed` notice.
//!
//! Both types provide `as_label` helpers for logging/metrics.

use thiserror::Error;

/// # Errors surfaced synchronously to bus callers.
///
/// Everything here is a *pre-dispatch* condition: once dispatch has been
/// initiated, `publish` resolves successfully and all subsequent failures are
/// reported asynchronously through the notification channel.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// Payload did not conform to the schema registered for the topic.
    ///
    /// Raised before any handler is invoked and before any `published.*`
    /// metric is recorded.
    #[error("schema validation failed for topic {topic:?}: {violations:?}")]
    SchemaValidation {
        /// Topic whose schema rejected the payload.
        topic: String,
        /// Human-readable violation messages from the validator.
        violations: Vec<String>,
    },

    /// The bus was used outside the `Ready` lifecycle state.
    #[error("bus is not ready (state: {state})")]
    NotReady {
        /// Name of the lifecycle state the bus was in.
        state: &'static str,
    },

    /// A required external collaborator could not be attached.
    ///
    /// Raised by `initialize` when schema validation is enabled but no
    /// schema source is configured, or when a schema fails to compile.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of what is missing or malformed.
        reason: String,
    },

    /// The topic string was empty. Topics are non-empty, dot-segmented
    /// namespaces (e.g. `"finance.monthly.summary.v1"`).
    #[error("topic must be a non-empty string")]
    InvalidTopic,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicbus::BusError;
    ///
    /// let err = BusError::InvalidTopic;
    /// assert_eq!(err.as_label(), "invalid_topic");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::SchemaValidation { .. } => "schema_validation",
            BusError::NotReady { .. } => "not_ready",
            BusError::Configuration { .. } => "configuration",
            BusError::InvalidTopic => "invalid_topic",
        }
    }
}

/// # Failure of a single handler invocation.
///
/// Wraps the handler's original error message. One failing handler never
/// affects another handler's delivery or the publisher's control flow: the
/// bus retries the invocation up to the configured ceiling and then reports
/// the last error through the `event:failed` notice.
#[derive(Error, Debug, Clone)]
#[error("handler failed: {message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Wraps an error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The wrapped message, as reported in `event:failed` notices.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
