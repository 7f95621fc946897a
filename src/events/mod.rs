//! Event data model and bus-level notices.
//!
//! ## Contents
//! - [`Event`], [`EventId`] the published occurrence handlers receive
//! - [`Notice`], [`NoticeKind`] typed bus-level notifications (terminal
//!   delivery failures), consumed via
//!   [`EventBus::on`](crate::EventBus::on)
//!
//! ## Quick reference
//! - **Producers**: `core::dispatcher` builds events from publish calls;
//!   `core::retry` emits `EventFailed` notices on retry exhaustion.
//! - **Consumers**: handlers (`&Event`), notice listeners (`&Notice`).

mod event;
mod notice;

pub use event::{Event, EventId};
pub use notice::{Notice, NoticeKind, NoticeListener};

pub(crate) use notice::Notifier;
