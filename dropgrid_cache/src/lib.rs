// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=dropgrid_cache --heading-base-level=0

//! Dropgrid Cache: memoized interval-to-pixel positions.
//!
//! Rendering any item on the time grid needs its pixel position, derived
//! from its time interval by an external pure mapping function. During a
//! drag that derivation runs hundreds of times per second over
//! near-identical inputs; this crate memoizes it with:
//!
//! - keys truncated to whole minutes (sub-minute jitter shares one entry),
//! - lazy age expiry and a hard capacity with batched approximate-LRU
//!   eviction (lowest `(last_accessed, access_count)` decile per batch),
//! - dependency-tagged invalidation for changes that move pixels without
//!   moving time (attendee list, sharing flag), and per-item invalidation
//!   for direct time changes,
//! - an [`InvalidationBatcher`] that deduplicates a frame's worth of
//!   invalidations into one cache pass,
//! - hit/miss/eviction/invalidation counters plus a rolling latency window.
//!
//! # Example
//!
//! ```rust
//! use dropgrid_cache::{CacheConfig, PositionCache, SlotPosition};
//! use dropgrid_timing::ManualClock;
//!
//! let mut cache: PositionCache<u32, &str, _> =
//!     PositionCache::new(CacheConfig::default(), ManualClock::new(0));
//!
//! // First read computes; the closure is the external pixel mapper.
//! let p = cache.get_or_compute(7, 9 * 3600, 10 * 3600, &["cal:work"], |start, end| {
//!     Ok::<_, core::convert::Infallible>(SlotPosition {
//!         offset: start as f64 / 60.0,
//!         length: (end - start) as f64 / 60.0,
//!     })
//! });
//! assert_eq!(p.length, 60.0);
//!
//! // Second read within the same minute hits.
//! let _ = cache.get_or_compute(7, 9 * 3600 + 5, 10 * 3600 + 5, &[], |_, _| {
//!     Err("never called")
//! });
//! assert_eq!(cache.metrics().hits, 1);
//! ```
//!
//! This crate is `no_std` (with `alloc`) unless the default `std` feature is
//! enabled for the system clock in `dropgrid_timing`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod batch;
pub mod cache;

pub use batch::InvalidationBatcher;
pub use cache::{CacheConfig, CacheMetrics, FALLBACK_POSITION, PositionCache, SlotPosition};
