// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conflict detection and side-by-side layout groups.
//!
//! Checks a candidate drop for overlaps, groups the day's items into
//! transitive overlap clusters, and memoizes their pixel positions.
//!
//! Run:
//! - `cargo run -p dropgrid_demos --example conflict_layout`

use dropgrid_cache::{CacheConfig, PositionCache, SlotPosition};
use dropgrid_conflict::{
    ScheduledItem, TimeRange, WorkingHours, check_conflict, find_next_free_slot,
    group_overlapping_blocks,
};
use dropgrid_timing::SystemClock;

fn main() {
    // A morning with a chained overlap: 9:00-10:00, 9:30-10:30, and a
    // disjoint 12:00-12:45.
    let items = [
        ScheduledItem { id: 1_u32, start: 9 * 60, end: Some(10 * 60) },
        ScheduledItem { id: 2, start: 9 * 60 + 30, end: Some(10 * 60 + 30) },
        ScheduledItem { id: 3, start: 12 * 60, end: Some(12 * 60 + 45) },
    ];

    // Candidate 10:30-11:30 only touches item 2: no conflict.
    let report = check_conflict(TimeRange::new(10 * 60 + 30, 11 * 60 + 30), &items, None);
    println!("10:30-11:30 conflicts: {}", report.has_conflict());

    // Candidate 9:45-10:15 overlaps both morning items.
    let report = check_conflict(TimeRange::new(9 * 60 + 45, 10 * 60 + 15), &items, None);
    println!(
        "9:45-10:15 conflicts with {:?}",
        report.conflicting.iter().map(|i| i.id).collect::<Vec<_>>()
    );

    // Transitive grouping drives side-by-side widths: items 1 and 2 share a
    // cluster, item 3 stands alone.
    let groups = group_overlapping_blocks(&items);
    for (i, group) in groups.iter().enumerate() {
        let ids: Vec<_> = group.iter().map(|item| item.id).collect();
        println!("cluster {i}: {ids:?} -> width 1/{}", group.len());
    }

    // Where does the next free hour fit?
    let slot = find_next_free_slot(60, 9 * 60, &items, WorkingHours::default(), 7, None);
    println!("next free hour: {slot:?}");

    // Memoize pixel positions for rendering the clusters.
    let mut cache: PositionCache<u32, &str, _> =
        PositionCache::new(CacheConfig::default(), SystemClock::new());
    for group in &groups {
        for item in group {
            let range = item.range();
            let position = cache.get_or_compute(
                item.id,
                range.start * 60,
                range.end * 60,
                &["layout"],
                |start_sec, end_sec| {
                    Ok::<_, std::convert::Infallible>(SlotPosition {
                        offset: start_sec as f64 / 60.0,
                        length: (end_sec - start_sec) as f64 / 60.0,
                    })
                },
            );
            println!(
                "item {} -> offset {:.0}px, length {:.0}px",
                item.id, position.offset, position.length
            );
        }
    }
    let metrics = cache.metrics();
    println!("cache: {} misses, {} hits", metrics.misses, metrics.hits);
}
