// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A full drag gesture through the engine.
//!
//! Position samples flow into the batch queue, commit once per frame into
//! the surface, and queries answer "what is near the pointer?" between
//! frames.
//!
//! Run:
//! - `cargo run -p dropgrid_demos --example drag_drop_week`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;

use dropgrid_scheduler::{BatchQueue, UpdateCategory};
use dropgrid_surface::{DragSession, DropTarget, ItemId, QueryFilter, SurfaceConfig, WeekSurface};
use dropgrid_timing::{Clock, FramePacer, ManualClock};

fn main() {
    let clock = ManualClock::new(0);
    let surface = Rc::new(RefCell::new(WeekSurface::new(SurfaceConfig::default())));
    let mut queue: BatchQueue<ItemId, UpdateCategory> = BatchQueue::new(FramePacer::default());
    let mut drag = DragSession::default();

    // Seed one block at Monday 09:00.
    let item = ItemId(7);
    surface.borrow_mut().place_block(item, 0, 540.0, 60.0);
    let _ = surface.borrow_mut().commit();

    // Grab it and stream samples faster than the frame rate.
    drag.start(item, Point::new(100.0, 570.0));
    for step in 1..=12_u64 {
        let pos = Point::new(100.0 + step as f64 * 25.0, 570.0 + step as f64 * 2.0);
        let _ = drag.update(pos);

        let surface_ref = Rc::clone(&surface);
        let _ = queue.schedule(
            item,
            UpdateCategory::Position,
            0,
            0,
            clock.now_millis(),
            move || {
                let day = surface_ref.borrow().day_at(pos.x).unwrap_or(0);
                surface_ref.borrow_mut().place_block(item, day, pos.y - 30.0, 60.0);
                Ok(())
            },
        );
        clock.advance(4); // ~250Hz sampling against 60Hz frames

        if let Some(outcome) = queue.run_due(clock.now_millis()) {
            let damage = surface.borrow_mut().commit();
            println!(
                "frame {:>4}ms: committed {} update(s), {} dirty rect(s)",
                clock.now_millis(),
                outcome.executed,
                damage.dirty_rects.len()
            );

            // Highlight candidate drop slots near the pointer.
            let near = surface.borrow().nearby_slots(pos, 150.0);
            println!("  {} droppable slot(s) in range, nearest {:?}", near.len(), near.first());
        }
    }

    // Drag end resolves synchronously: flush, commit, hit-test.
    let dropped = drag.end().expect("a drag was active");
    let _ = queue.force_run();
    let _ = surface.borrow_mut().commit();

    let hit = surface
        .borrow()
        .hit_test(Point::new(400.0, 590.0), QueryFilter::default());
    println!("dropped {dropped:?}; surface reports {:?}", hit.map(|h| h.target));
    assert!(matches!(
        hit.map(|h| h.target),
        Some(DropTarget::Block { .. })
    ));

    let stats = surface.borrow().stats();
    println!(
        "index: {} entries across {} buckets (mean occupancy {:.2})",
        stats.entries, stats.backend.buckets, stats.backend.mean_occupancy
    );
}
