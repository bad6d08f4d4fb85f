// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Next-free-slot probing across working hours.

use crate::detect::check_conflict;
use crate::range::{DAY_MIN, Minutes, ScheduledItem, TimeRange};

/// Daily window eligible for automatic placement, in whole hours.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorkingHours {
    /// First eligible hour (inclusive).
    pub start_hour: u8,
    /// First ineligible hour (exclusive).
    pub end_hour: u8,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 18,
        }
    }
}

impl WorkingHours {
    fn window_for_day(&self, day: Minutes) -> TimeRange {
        let base = day * DAY_MIN;
        TimeRange::new(
            base + Minutes::from(self.start_hour) * 60,
            base + Minutes::from(self.end_hour) * 60,
        )
    }
}

/// Probe step granularity.
const STEP_MIN: Minutes = 15;

/// Find the earliest conflict-free interval of `duration` minutes at or
/// after `from`, probing in quarter-hour steps across working hours, day by
/// day, for at most `horizon_days` days.
///
/// Returns `None` when the window is exhausted; exhaustion is an expected
/// outcome (dense week), not an error.
pub fn find_next_free_slot<Id: Copy + PartialEq>(
    duration: Minutes,
    from: Minutes,
    items: &[ScheduledItem<Id>],
    hours: WorkingHours,
    horizon_days: u32,
    exclude: Option<Id>,
) -> Option<TimeRange> {
    debug_assert!(duration > 0, "duration must be positive");
    debug_assert!(hours.start_hour < hours.end_hour, "empty working window");
    let first_day = from.div_euclid(DAY_MIN);
    for day in first_day..first_day + Minutes::from(horizon_days) {
        let window = hours.window_for_day(day);
        // Snap the earliest candidate up to the probe grid.
        let mut start = window.start.max(from);
        let rem = start.rem_euclid(STEP_MIN);
        if rem != 0 {
            start += STEP_MIN - rem;
        }
        while start + duration <= window.end {
            let candidate = TimeRange::new(start, start + duration);
            if !check_conflict(candidate, items, exclude).has_conflict() {
                return Some(candidate);
            }
            start += STEP_MIN;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, start: Minutes, end: Minutes) -> ScheduledItem<u32> {
        ScheduledItem {
            id,
            start,
            end: Some(end),
        }
    }

    #[test]
    fn empty_calendar_places_at_window_start() {
        let slot = find_next_free_slot::<u32>(60, 0, &[], WorkingHours::default(), 7, None);
        assert_eq!(slot, Some(TimeRange::new(8 * 60, 9 * 60)));
    }

    #[test]
    fn probe_skips_past_busy_morning() {
        // 8:00-10:30 busy; next quarter-hour start with a free hour is 10:30.
        let items = [item(1, 8 * 60, 10 * 60 + 30)];
        let slot = find_next_free_slot(60, 0, &items, WorkingHours::default(), 7, None);
        assert_eq!(slot, Some(TimeRange::new(10 * 60 + 30, 11 * 60 + 30)));
    }

    #[test]
    fn from_midday_respects_lower_bound() {
        let slot =
            find_next_free_slot::<u32>(30, 13 * 60 + 7, &[], WorkingHours::default(), 7, None);
        // Snapped up to the quarter-hour grid.
        assert_eq!(slot, Some(TimeRange::new(13 * 60 + 15, 13 * 60 + 45)));
    }

    #[test]
    fn slot_rolls_over_to_next_day() {
        // Whole first working day busy.
        let items = [item(1, 8 * 60, 18 * 60)];
        let slot = find_next_free_slot(60, 0, &items, WorkingHours::default(), 7, None);
        assert_eq!(slot, Some(TimeRange::new(DAY_MIN + 8 * 60, DAY_MIN + 9 * 60)));
    }

    #[test]
    fn exhausted_horizon_returns_none() {
        // Two fully busy days, horizon of two days.
        let items = [item(1, 8 * 60, 18 * 60), item(2, DAY_MIN + 8 * 60, DAY_MIN + 18 * 60)];
        let slot = find_next_free_slot(60, 0, &items, WorkingHours::default(), 2, None);
        assert_eq!(slot, None);
    }

    #[test]
    fn duration_longer_than_window_never_fits() {
        let slot = find_next_free_slot::<u32>(11 * 60, 0, &[], WorkingHours::default(), 3, None);
        assert_eq!(slot, None);
    }

    #[test]
    fn excluded_item_does_not_block_its_own_slot() {
        let items = [item(1, 8 * 60, 9 * 60)];
        let slot = find_next_free_slot(60, 0, &items, WorkingHours::default(), 7, Some(1));
        assert_eq!(slot, Some(TimeRange::new(8 * 60, 9 * 60)));
    }
}
