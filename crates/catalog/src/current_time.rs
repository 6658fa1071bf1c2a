//! Coarse "current time" shared by active-category queries.
//!
//! Reusing one timestamp for a short window lets a downstream query cache key
//! on a stable value instead of one that changes every millisecond.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use cartledger_core::Clock;

const EMPTY: i64 = i64::MIN;

/// Lazily refreshed timestamp cache.
///
/// The timestamp is a single `AtomicI64` of epoch milliseconds, replaced with
/// compare-and-swap. A reader therefore sees either the previous or the new
/// value in full. When several readers notice expiry at once, one CAS wins and
/// the others adopt the winner's value.
///
/// Expiry is evaluated against the resolution in force at read time. Changing
/// the resolution never rewrites the cached value itself.
#[derive(Debug)]
pub struct CurrentTimeCache {
    cached_ms: AtomicI64,
    resolution_ms: AtomicU64,
}

impl CurrentTimeCache {
    pub fn new(resolution: Duration) -> Self {
        Self {
            cached_ms: AtomicI64::new(EMPTY),
            resolution_ms: AtomicU64::new(duration_ms(resolution)),
        }
    }

    pub fn resolution(&self) -> Duration {
        Duration::from_millis(self.resolution_ms.load(Ordering::Relaxed))
    }

    pub fn set_resolution(&self, resolution: Duration) {
        self.resolution_ms
            .store(duration_ms(resolution), Ordering::Relaxed);
    }

    /// Cached value, if any read has populated it yet.
    pub fn peek(&self) -> Option<DateTime<Utc>> {
        match self.cached_ms.load(Ordering::Acquire) {
            EMPTY => None,
            ms => Some(from_ms(ms)),
        }
    }

    /// Current time at cache resolution.
    pub fn now(&self, clock: &dyn Clock) -> DateTime<Utc> {
        let now_ms = clock.now().timestamp_millis();
        let cached = self.cached_ms.load(Ordering::Acquire);

        if cached != EMPTY && !self.is_expired(cached, now_ms) {
            return from_ms(cached);
        }

        match self
            .cached_ms
            .compare_exchange(cached, now_ms, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                tracing::debug!(cached_ms = now_ms, "current time cache refreshed");
                from_ms(now_ms)
            }
            Err(winner) => from_ms(winner),
        }
    }

    fn is_expired(&self, cached_ms: i64, now_ms: i64) -> bool {
        let resolution = i64::try_from(self.resolution_ms.load(Ordering::Relaxed)).unwrap_or(i64::MAX);
        now_ms.saturating_sub(cached_ms) > resolution
    }
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
