// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=dropgrid_conflict --heading-base-level=0

//! Dropgrid Conflict: interval overlap detection for scheduled items.
//!
//! Answers "does this placement overlap something?" while an item is dragged
//! over a calendar, and groups mutually overlapping items for side-by-side
//! layout.
//!
//! - [`TimeRange::overlaps`]: the pure predicate, exclusive at both
//!   boundaries — back-to-back items never conflict.
//! - [`check_conflict`]: a candidate interval against a read-only snapshot
//!   of scheduled items, with the candidate's own prior placement excluded.
//! - [`group_overlapping_blocks`]: O(n log n) sweep-line clustering;
//!   clusters are transitive by design.
//! - [`find_next_free_slot`]: bounded linear probe across working hours.
//!
//! # Example
//!
//! ```rust
//! use dropgrid_conflict::{ScheduledItem, TimeRange, check_conflict};
//!
//! let existing = [ScheduledItem { id: 1_u32, start: 630, end: Some(690) }];
//!
//! // 10:00-11:00 against 10:30-11:30: conflict.
//! assert!(check_conflict(TimeRange::new(600, 660), &existing, None).has_conflict());
//!
//! // 9:00-10:30 against 10:30-11:30: touching, no conflict.
//! assert!(!check_conflict(TimeRange::new(540, 630), &existing, None).has_conflict());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod detect;
pub mod range;
pub mod slot;

pub use detect::{ConflictReport, check_conflict, group_overlapping_blocks};
pub use range::{DAY_MIN, DEFAULT_DURATION_MIN, Minutes, ScheduledItem, TimeRange};
pub use slot::{WorkingHours, find_next_free_slot};
