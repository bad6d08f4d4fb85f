// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dropgrid Timing: logical time for cooperative batching.
//!
//! The engine never talks to a timer or animation-frame API directly.
//! Instead, every time-dependent piece takes a [`Clock`] and computes
//! explicit deadlines with [`FramePacer`]; the host drives the engine by
//! calling into it when a deadline passes. This keeps batching and cache
//! expiry fully deterministic under test: advance a [`ManualClock`], call,
//! assert.
//!
//! ```rust
//! use dropgrid_timing::{Clock, FramePacer, ManualClock};
//!
//! let clock = ManualClock::new(0);
//! let pacer = FramePacer::default();
//!
//! // A sub-frame delay resolves to the next frame boundary.
//! assert_eq!(pacer.deadline(clock.now_millis(), 5), 16);
//!
//! // A multi-frame delay is an explicit timer deadline.
//! clock.advance(16);
//! assert_eq!(pacer.deadline(clock.now_millis(), 100), 116);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

use core::cell::Cell;

/// Milliseconds of logical time.
pub type Millis = u64;

/// A source of monotonic milliseconds.
///
/// Implementations must be cheap to call; the cache stamps every access.
pub trait Clock {
    /// Milliseconds elapsed since this clock's origin.
    fn now_millis(&self) -> Millis;
}

/// A hand-driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    /// Create a clock reading `now`.
    pub fn new(now: Millis) -> Self {
        Self { now: Cell::new(now) }
    }

    /// Advance by `delta` milliseconds.
    pub fn advance(&self, delta: Millis) {
        self.now.set(self.now.get() + delta);
    }

    /// Jump to an absolute reading.
    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        self.now.get()
    }
}

/// Monotonic wall clock, origin at construction.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "u64 milliseconds cover far beyond any session lifetime"
        )]
        let ms = self.origin.elapsed().as_millis() as Millis;
        ms
    }
}

/// Frame-boundary deadline arithmetic.
///
/// Given a frame interval, [`deadline`](Self::deadline) picks the tighter of
/// "next frame boundary" and "explicit delay from now": a delay shorter than
/// one frame lands on the frame boundary (the animation-frame case), a
/// longer one becomes a plain timer deadline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FramePacer {
    frame_ms: Millis,
}

impl Default for FramePacer {
    /// 16ms frames, the 60Hz budget.
    fn default() -> Self {
        Self { frame_ms: 16 }
    }
}

impl FramePacer {
    /// Create a pacer with an explicit frame interval.
    pub fn new(frame_ms: Millis) -> Self {
        debug_assert!(frame_ms > 0, "frame interval must be positive");
        Self { frame_ms }
    }

    /// The frame interval in milliseconds.
    pub fn frame_ms(&self) -> Millis {
        self.frame_ms
    }

    /// The first frame boundary strictly after `now`.
    pub fn next_frame(&self, now: Millis) -> Millis {
        (now / self.frame_ms + 1) * self.frame_ms
    }

    /// Commit deadline for a request arriving at `now` with the given
    /// maximum acceptable delay.
    pub fn deadline(&self, now: Millis, max_delay_ms: Millis) -> Millis {
        if max_delay_ms > self.frame_ms {
            now + max_delay_ms
        } else {
            self.next_frame(now)
        }
    }
}
