//! # Bus construction configuration.
//!
//! Provides [`BusConfig`], the recognized options for building an
//! [`EventBus`](crate::EventBus).
//!
//! ## Field semantics
//! - `validate_schemas`: check payloads against registered schemas before
//!   dispatch (default `false`)
//! - `max_retries`: retries per failing handler invocation before permanent
//!   failure (default `3`; `0` = fail after the initial attempt)
//! - `enable_metrics`: whether delivery counters are tracked at all
//!   (default `true`)
//! - `backoff`: delay policy between retry attempts

use crate::policies::BackoffPolicy;

/// Configuration for a single bus instance.
///
/// All fields are public; `BusConfig::default()` gives the documented
/// defaults. Each bus owns its own copy, so multiple buses with different
/// settings can coexist in one process.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Validate payloads against the topic's registered schema before
    /// dispatch.
    ///
    /// When enabled, `initialize` requires a schema source to be attached
    /// and `publish` rejects non-conforming payloads with
    /// `BusError::SchemaValidation`. Topics without a registered schema
    /// pass validation (permissive default).
    pub validate_schemas: bool,

    /// Maximum retries per failing handler invocation.
    ///
    /// A handler is invoked at most `max_retries + 1` times per event
    /// (the initial attempt plus up to `max_retries` retries). After the
    /// ceiling is reached, exactly one `event:failed` notice fires and the
    /// retry state is discarded.
    pub max_retries: u32,

    /// Whether delivery counters (`published.*`, `handled.*`, `failed.*`)
    /// are tracked. When disabled, `metrics()` always returns an empty
    /// snapshot.
    pub enable_metrics: bool,

    /// Delay policy between retry attempts for a failing handler.
    pub backoff: BackoffPolicy,
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `validate_schemas = false`
    /// - `max_retries = 3`
    /// - `enable_metrics = true`
    /// - `backoff = BackoffPolicy::default()` (100ms first, factor 2.0,
    ///   capped at 30s, no jitter)
    fn default() -> Self {
        Self {
            validate_schemas: false,
            max_retries: 3,
            enable_metrics: true,
            backoff: BackoffPolicy::default(),
        }
    }
}
