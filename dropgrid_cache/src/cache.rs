// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The position cache proper: keyed lookups, lazy expiry, batched eviction.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt::{Debug, Display};
use core::hash::Hash;

use dropgrid_timing::{Clock, Millis};
use hashbrown::HashMap;

/// A rendered position on the time axis: pixel offset from the surface top
/// and pixel length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlotPosition {
    /// Offset from the top of the day column, in pixels.
    pub offset: f64,
    /// Rendered length, in pixels.
    pub length: f64,
}

/// Neutral position returned when the mapper fails: top of the column, one
/// default row tall. A wrong-but-visible block beats a hole in the layout.
pub const FALLBACK_POSITION: SlotPosition = SlotPosition {
    offset: 0.0,
    length: 60.0,
};

/// Cache tuning knobs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Hard entry capacity; insertion at capacity evicts a batch first.
    pub max_size: usize,
    /// Entries older than this are treated as absent on read.
    pub max_age_ms: Millis,
}

impl Default for CacheConfig {
    /// 512 entries, one-minute expiry: enough for a busy week view several
    /// times over, small enough that a stale pixel mapping cannot outlive a
    /// layout change for long.
    fn default() -> Self {
        Self {
            max_size: 512,
            max_age_ms: 60_000,
        }
    }
}

/// Counters exposed for tuning and diagnostics only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheMetrics {
    /// Reads served from a live entry.
    pub hits: u64,
    /// Reads that invoked the mapper (absent or expired entry).
    pub misses: u64,
    /// Entries removed by capacity eviction.
    pub evictions: u64,
    /// Entries removed by dependency or item invalidation.
    pub invalidations: u64,
    /// Mean access latency in milliseconds over the last 100 accesses.
    pub rolling_latency_ms: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey<Id> {
    id: Id,
    start_min: i64,
    end_min: i64,
}

#[derive(Clone, Debug)]
struct Entry<D> {
    position: SlotPosition,
    stamp: Millis,
    access_count: u64,
    last_accessed: Millis,
    deps: Vec<D>,
}

const LATENCY_WINDOW: usize = 100;

/// Memoizes the pixel position derived from a time interval.
///
/// Keys combine the item's identity with its interval truncated to whole
/// minutes — deliberately coarser than the source timestamps, trading a
/// sub-pixel accuracy loss for a much higher hit rate while an item is
/// dragged through many near-identical samples per second.
///
/// The pixel-mapping function is supplied per call and never stored, so the
/// cache owns no I/O and runs under a [`ManualClock`](dropgrid_timing::ManualClock)
/// in tests.
#[derive(Debug)]
pub struct PositionCache<Id, D, C> {
    entries: HashMap<CacheKey<Id>, Entry<D>>,
    config: CacheConfig,
    clock: C,
    hits: u64,
    misses: u64,
    evictions: u64,
    invalidations: u64,
    latencies: VecDeque<Millis>,
}

impl<Id, D, C> PositionCache<Id, D, C>
where
    Id: Copy + Eq + Hash + Debug,
    D: Clone + Eq,
    C: Clock,
{
    /// Create a cache with the given configuration and clock.
    pub fn new(config: CacheConfig, clock: C) -> Self {
        debug_assert!(config.max_size > 0, "cache capacity must be positive");
        Self {
            entries: HashMap::new(),
            config,
            clock,
            hits: 0,
            misses: 0,
            evictions: 0,
            invalidations: 0,
            latencies: VecDeque::with_capacity(LATENCY_WINDOW),
        }
    }

    /// Number of live entries (including ones past `max_age` that no read
    /// has touched yet; expiry is lazy).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry without touching the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Look up the position for `id` over `[start_sec, end_sec)`, invoking
    /// `mapper` on a miss and memoizing its result under the given
    /// dependency tags.
    ///
    /// A mapper error is logged and degrades to [`FALLBACK_POSITION`]
    /// without being cached, so one bad item never poisons later reads or
    /// blocks the rest of a frame.
    pub fn get_or_compute<F, E>(
        &mut self,
        id: Id,
        start_sec: i64,
        end_sec: i64,
        deps: &[D],
        mapper: F,
    ) -> SlotPosition
    where
        F: FnOnce(i64, i64) -> Result<SlotPosition, E>,
        E: Display,
    {
        let began = self.clock.now_millis();
        let key = CacheKey {
            id,
            start_min: start_sec.div_euclid(60),
            end_min: end_sec.div_euclid(60),
        };

        let max_age = self.config.max_age_ms;
        if let Some(entry) = self.entries.get_mut(&key) {
            if began.saturating_sub(entry.stamp) <= max_age {
                entry.access_count += 1;
                entry.last_accessed = began;
                let position = entry.position;
                self.hits += 1;
                self.note_latency(began);
                return position;
            }
            // Expired: fall through to recompute.
            self.entries.remove(&key);
        }

        self.misses += 1;
        let position = match mapper(start_sec, end_sec) {
            Ok(p) => p,
            Err(err) => {
                log::warn!("position mapping failed for {id:?}: {err}");
                self.note_latency(began);
                return FALLBACK_POSITION;
            }
        };

        if self.entries.len() >= self.config.max_size {
            self.evict_batch();
        }
        let now = self.clock.now_millis();
        self.entries.insert(
            key,
            Entry {
                position,
                stamp: now,
                access_count: 1,
                last_accessed: now,
                deps: deps.to_vec(),
            },
        );
        self.note_latency(began);
        position
    }

    /// Remove every entry whose dependency list contains `dep`. Returns the
    /// number removed.
    ///
    /// For changes that affect derived positions without moving the interval
    /// itself (attendee list, sharing flag).
    pub fn invalidate_dependency(&mut self, dep: &D) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.deps.contains(dep));
        let removed = before - self.entries.len();
        self.invalidations += removed as u64;
        removed
    }

    /// Remove every entry keyed to `id`, regardless of dependencies. For
    /// direct time or identity changes.
    pub fn invalidate_item(&mut self, id: Id) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.id != id);
        let removed = before - self.entries.len();
        self.invalidations += removed as u64;
        removed
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> CacheMetrics {
        let rolling_latency_ms = if self.latencies.is_empty() {
            0.0
        } else {
            let total: Millis = self.latencies.iter().sum();
            total as f64 / self.latencies.len() as f64
        };
        CacheMetrics {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            invalidations: self.invalidations,
            rolling_latency_ms,
        }
    }

    /// Evict the lowest-ranked decile (at least one entry), ranked by
    /// `(last_accessed, access_count)` ascending. Batched so a hot insert
    /// path pays the sort once per decile, not per entry.
    fn evict_batch(&mut self) {
        let mut ranked: Vec<(CacheKey<Id>, Millis, u64)> = self
            .entries
            .iter()
            .map(|(k, e)| (*k, e.last_accessed, e.access_count))
            .collect();
        ranked.sort_by_key(|&(_, last, count)| (last, count));
        let batch = (self.config.max_size / 10).max(1);
        for (key, _, _) in ranked.into_iter().take(batch) {
            self.entries.remove(&key);
            self.evictions += 1;
        }
    }

    fn note_latency(&mut self, began: Millis) {
        let elapsed = self.clock.now_millis().saturating_sub(began);
        if self.latencies.len() == LATENCY_WINDOW {
            self.latencies.pop_front();
        }
        self.latencies.push_back(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use dropgrid_timing::ManualClock;

    fn mapped(start_sec: i64, _end_sec: i64) -> Result<SlotPosition, Infallible> {
        Ok(SlotPosition {
            offset: start_sec as f64 / 60.0,
            length: 30.0,
        })
    }

    fn cache(max_size: usize) -> PositionCache<u32, &'static str, ManualClock> {
        PositionCache::new(
            CacheConfig {
                max_size,
                max_age_ms: 1_000,
            },
            ManualClock::new(0),
        )
    }

    #[test]
    fn second_read_is_a_hit() {
        let mut c = cache(16);
        let p1 = c.get_or_compute(1, 600, 1200, &[], mapped);
        let p2 = c.get_or_compute(1, 600, 1200, &[], |_, _| -> Result<_, Infallible> {
            unreachable!("must be served from cache")
        });
        assert_eq!(p1, p2);
        let m = c.metrics();
        assert_eq!((m.hits, m.misses), (1, 1));
    }

    #[test]
    fn sub_minute_differences_share_a_key() {
        let mut c = cache(16);
        let _ = c.get_or_compute(1, 600, 1200, &[], mapped);
        // 9 seconds later within the same minute: still a hit.
        let _ = c.get_or_compute(1, 609, 1209, &[], |_, _| -> Result<_, Infallible> {
            unreachable!("minute truncation must coalesce these keys")
        });
        assert_eq!(c.metrics().hits, 1);
    }

    #[test]
    fn expired_entry_reads_as_miss() {
        let mut c = cache(16);
        let _ = c.get_or_compute(1, 600, 1200, &[], mapped);
        c.clock.advance(2_000);
        let _ = c.get_or_compute(1, 600, 1200, &[], mapped);
        let m = c.metrics();
        assert_eq!((m.hits, m.misses), (0, 2));
        assert_eq!(c.len(), 1, "expired entry was replaced, not duplicated");
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut c = cache(20);
        for i in 0..200_u32 {
            let _ = c.get_or_compute(i, i as i64 * 60, i as i64 * 60 + 60, &[], mapped);
            assert!(c.len() <= 20);
        }
        assert!(c.metrics().evictions > 0);
    }

    #[test]
    fn eviction_prefers_cold_entries() {
        let mut c = cache(10);
        for i in 0..10_u32 {
            let _ = c.get_or_compute(i, 0, 60, &[], mapped);
            c.clock.advance(1);
        }
        // Keep entry 0 hot.
        c.clock.advance(1);
        let _ = c.get_or_compute(0, 0, 60, &[], mapped);
        // Trigger one eviction batch.
        let _ = c.get_or_compute(99, 0, 60, &[], mapped);
        // Entry 0 must have survived; it was the most recently touched.
        let _ = c.get_or_compute(0, 0, 60, &[], |_, _| -> Result<_, Infallible> {
            unreachable!("hot entry must survive the eviction batch")
        });
    }

    #[test]
    fn dependency_invalidation_is_exact() {
        let mut c = cache(16);
        let _ = c.get_or_compute(1, 0, 60, &["attendees:1"], mapped);
        let _ = c.get_or_compute(2, 60, 120, &["attendees:2"], mapped);
        let _ = c.get_or_compute(3, 120, 180, &["attendees:1", "shared"], mapped);
        let removed = c.invalidate_dependency(&"attendees:1");
        assert_eq!(removed, 2);
        assert_eq!(c.len(), 1);
        assert_eq!(c.metrics().invalidations, 2);
        // The untouched entry still hits.
        let _ = c.get_or_compute(2, 60, 120, &[], |_, _| -> Result<_, Infallible> {
            unreachable!("disjoint dependencies must be untouched")
        });
    }

    #[test]
    fn item_invalidation_ignores_dependencies() {
        let mut c = cache(16);
        let _ = c.get_or_compute(1, 0, 60, &["x"], mapped);
        let _ = c.get_or_compute(1, 120, 180, &["y"], mapped);
        let _ = c.get_or_compute(2, 0, 60, &["x"], mapped);
        assert_eq!(c.invalidate_item(1), 2);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn mapper_failure_degrades_and_is_not_cached() {
        let mut c = cache(16);
        let p = c.get_or_compute(1, 0, 60, &[], |_, _| Err("style sheet not ready"));
        assert_eq!(p, FALLBACK_POSITION);
        assert!(c.is_empty());
        // Next read retries the mapper.
        let p = c.get_or_compute(1, 0, 60, &[], mapped);
        assert_ne!(p, FALLBACK_POSITION);
    }

    #[test]
    fn latency_window_reports_a_mean() {
        let mut c = cache(16);
        let _ = c.get_or_compute(1, 0, 60, &[], mapped);
        assert!(c.metrics().rolling_latency_ms >= 0.0);
    }
}
