//! # Randomized retry delays.
//!
//! When several subscriptions fail on the same event (a shared downstream
//! outage is the usual culprit), their retry timers fire in lockstep and hit
//! the recovering dependency together. [`JitterPolicy`] spreads those timers
//! out by randomizing the delay the backoff policy computed.
//!
//! All strategies draw from a closed millisecond range; spans narrower than
//! one millisecond collapse to their lower bound.

use rand::Rng;
use std::time::Duration;

/// Randomization applied to a computed backoff delay.
///
/// `None` keeps delays exact (the default, and the right choice for
/// deterministic tests). `Full` trades the most predictability for the most
/// spread; `Equal` keeps at least half the computed delay; `Decorrelated`
/// ranges over the previous delay instead of the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// Use the computed delay as-is.
    #[default]
    None,

    /// Uniform over `[0, delay]`.
    Full,

    /// Uniform over `[delay/2, delay]`; never discards more than half the
    /// computed backoff.
    Equal,

    /// Uniform over `[base, prev × 3]`, capped at `max`. Needs the previous
    /// delay as context; see [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Randomizes `delay` according to the policy.
    ///
    /// `Decorrelated` is a pass-through here because it needs the previous
    /// delay; the backoff policy routes it to
    /// [`apply_decorrelated`](Self::apply_decorrelated) instead.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => random_between(Duration::ZERO, delay),
            JitterPolicy::Equal => {
                let floor = delay / 2;
                floor + random_between(Duration::ZERO, delay - floor)
            }
        }
    }

    /// Decorrelated jitter: uniform over `[base, prev × 3]`, capped at `max`
    /// and never below `base`.
    ///
    /// Falls back to [`apply`](Self::apply)`(prev)` for the other policies.
    pub fn apply_decorrelated(&self, base: Duration, prev: Duration, max: Duration) -> Duration {
        if *self != JitterPolicy::Decorrelated {
            return self.apply(prev);
        }
        let ceiling = prev.saturating_mul(3).min(max).max(base);
        random_between(base, ceiling)
    }
}

/// Uniform draw from `[lo, hi]` at millisecond resolution.
fn random_between(lo: Duration, hi: Duration) -> Duration {
    let lo_ms = lo.as_millis() as u64;
    let hi_ms = hi.as_millis() as u64;
    if hi_ms <= lo_ms {
        return lo;
    }
    Duration::from_millis(rand::rng().random_range(lo_ms..=hi_ms))
}
