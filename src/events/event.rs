//! # Published event value object.
//!
//! [`Event`] represents one published occurrence: a topic, an opaque JSON
//! payload, the publisher's identity, a creation timestamp, and a unique id
//! used for retry correlation and idempotent failure reporting.
//!
//! Events are immutable after construction. The dispatcher owns the event
//! for the duration of one publish call and shares it with handlers behind
//! an `Arc`; handlers receive a read-only view (`&Event`).
//!
//! ## Topics
//! A topic is a non-empty, dot-segmented namespace, e.g.
//! `"finance.monthly.summary.v1"`. Segment structure is a naming convention
//! only; the bus matches topics by exact string.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BusError;

/// Unique identifier assigned to each published event.
pub type EventId = Uuid;

/// One published occurrence, immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Unique per publish; correlates retries and failure notices.
    pub id: EventId,
    /// Non-empty, dot-segmented topic the event was published to.
    pub topic: String,
    /// Opaque structured payload; schema-checked before dispatch when
    /// validation is enabled.
    pub data: serde_json::Value,
    /// Identity of the publisher.
    pub source: String,
    /// Creation instant, set at publish time.
    pub at: SystemTime,
}

impl Event {
    /// Creates a new event with a fresh id and the current timestamp.
    ///
    /// Fails with [`BusError::InvalidTopic`] if `topic` is empty.
    pub fn new(
        topic: impl Into<String>,
        data: serde_json::Value,
        source: impl Into<String>,
    ) -> Result<Self, BusError> {
        let topic = topic.into();
        if topic.is_empty() {
            return Err(BusError::InvalidTopic);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            topic,
            data,
            source: source.into(),
            at: SystemTime::now(),
        })
    }
}
