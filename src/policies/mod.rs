//! Retry delay policies.
//!
//! This module groups the knobs that control **how long** the bus waits
//! before re-invoking a failed handler.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid thundering herd
//!
//! ## Quick wiring
//! ```text
//! BusConfig { max_retries, backoff: BackoffPolicy }
//!      └─► core::retry::RetryScheduler uses:
//!           - max_retries to decide retry/exhaust
//!           - backoff.next(attempt) to schedule the next invocation
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=100ms, factor=2.0 (exponential), max=30s.
//! - `JitterPolicy::None` by default; consider `Equal` when many handlers
//!   fail in lockstep.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
