//! # Backoff policy for retrying failed handler deliveries.
//!
//! [`BackoffPolicy`] controls how retry delays grow after repeated handler
//! failures. It is parameterized by:
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::first`] the initial delay;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay for retry `n` is computed as `first × factor^n`, clamped to
//! `max`, then jitter is applied. The base is derived purely from the retry
//! number, so jitter output never feeds back into subsequent calculations.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use topicbus::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//! // 100ms × 2^10 = 102_400ms → capped at max=10s
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy for handler re-invocation.
///
/// The delay is always bounded by [`BackoffPolicy::max`] and never blocks
/// the dispatching task: the retry scheduler sleeps on it inside an
/// independently spawned, cancellable task.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Initial delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap for retries.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter policy to prevent thundering herd.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a strategy with:
    /// - `first = 100ms`;
    /// - `factor = 2.0` (exponential);
    /// - `max = 30s`;
    /// - no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            jitter: JitterPolicy::None,
            factor: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay before retry number `retry` (0-indexed).
    ///
    /// The base delay is `first × factor^retry`, clamped to
    /// [`BackoffPolicy::max`]. Jitter is applied to the clamped base; the
    /// jittered result is never fed back into subsequent calculations.
    ///
    /// # Notes
    /// - `factor == 1.0` gives a constant delay of `first` (up to `max`).
    /// - Overflow or non-finite intermediates clamp to `max`.
    pub fn next(&self, retry: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let clamped_exp = retry.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}
