// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conflict checks against a snapshot of scheduled items, and the
//! sweep-line grouping used for side-by-side layout.

use alloc::vec::Vec;

use crate::range::{ScheduledItem, TimeRange};

/// Result of [`check_conflict`]: the existing items the candidate overlaps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConflictReport<Id> {
    /// Items whose normalized range overlaps the candidate, in snapshot order.
    pub conflicting: Vec<ScheduledItem<Id>>,
}

impl<Id> ConflictReport<Id> {
    /// True if any overlap was found.
    pub fn has_conflict(&self) -> bool {
        !self.conflicting.is_empty()
    }
}

/// Check a candidate placement against the current set of scheduled items.
///
/// Overlap boundaries are exclusive, so dropping an item flush against
/// another (end == next start) is not a conflict. `exclude` skips the
/// candidate's own prior placement: re-saving an unmoved item never
/// self-conflicts.
///
/// The snapshot is read-only and supplied per call; the detector owns no
/// state.
pub fn check_conflict<Id: Copy + PartialEq>(
    candidate: TimeRange,
    items: &[ScheduledItem<Id>],
    exclude: Option<Id>,
) -> ConflictReport<Id> {
    let mut conflicting = Vec::new();
    for item in items {
        if exclude.is_some_and(|ex| ex == item.id) {
            continue;
        }
        if candidate.overlaps(&item.range()) {
            conflicting.push(*item);
        }
    }
    ConflictReport { conflicting }
}

/// Group items into transitively-overlapping clusters for side-by-side
/// layout.
///
/// Sweep-line, O(n log n): sort by start, keep a running group and the
/// maximum end seen; an item starting at or after that maximum closes the
/// group, anything earlier joins it and may extend the maximum.
///
/// The clusters are **transitive**: A–B–C land in one group even when A and
/// C never directly overlap, because each pairwise link chains them. That is
/// deliberate, not an approximation — every member of a visual cluster must
/// share one column-width divisor or the layout widths disagree mid-chain.
pub fn group_overlapping_blocks<Id: Copy>(
    items: &[ScheduledItem<Id>],
) -> Vec<Vec<ScheduledItem<Id>>> {
    if items.is_empty() {
        return Vec::new();
    }
    let mut sorted: Vec<ScheduledItem<Id>> = items.to_vec();
    sorted.sort_by_key(|i| i.range().start);

    let mut groups: Vec<Vec<ScheduledItem<Id>>> = Vec::new();
    let mut current: Vec<ScheduledItem<Id>> = Vec::new();
    let mut max_end = i64::MIN;

    for item in sorted {
        let range = item.range();
        if !current.is_empty() && range.start >= max_end {
            groups.push(core::mem::take(&mut current));
        }
        max_end = max_end.max(range.end);
        current.push(item);
    }
    groups.push(current);
    groups
}
