// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=dropgrid_scheduler --heading-base-level=0

//! Dropgrid Scheduler: coalesce a gesture's firehose into one commit per
//! frame.
//!
//! A drag emits position samples far faster than the surface should re-index
//! or repaint. [`BatchQueue`] absorbs them: per-target coalescing (only the
//! most recent update for a target survives to the commit), a single
//! deadline computed from the tightest pending request, and a strict
//! execution order — category, then descending priority, then FIFO — so a
//! commit is observed whole, never half-applied.
//!
//! Everything is driven by logical time from [`dropgrid_timing`]; there is
//! no timer or event loop inside, which is what makes the ordering
//! guarantees testable.
//!
//! # Example
//!
//! ```rust
//! use dropgrid_scheduler::{BatchQueue, UpdateCategory};
//! use dropgrid_timing::FramePacer;
//!
//! let mut queue: BatchQueue<&str, UpdateCategory> = BatchQueue::new(FramePacer::default());
//!
//! // Three samples for one target before the frame boundary...
//! for (i, x) in [10.0, 11.5, 13.0_f64].into_iter().enumerate() {
//!     let _ = queue.schedule("drag:7", UpdateCategory::Position, 0, 0, i as u64, move || {
//!         // apply `x` to the index here
//!         let _ = x;
//!         Ok(())
//!     });
//! }
//! assert_eq!(queue.len(), 1, "coalesced by target");
//!
//! // ...commit exactly once at the boundary.
//! let outcome = queue.run_due(16).expect("due");
//! assert_eq!(outcome.executed, 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod queue;

pub use queue::{
    BatchOutcome, BatchQueue, CommitFn, Priority, UpdateCategory, UpdateError, UpdateId,
};
