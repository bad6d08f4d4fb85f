// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The week surface: pre-warmed drop-target grid plus block placement.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::{Point, Rect};

use dropgrid_conflict::{ConflictReport, DAY_MIN, Minutes, ScheduledItem, TimeRange, check_conflict};
use dropgrid_index::{Box2D, GridIndex, IndexStats, Key};

use crate::types::{DropTarget, ItemId, QueryFilter, SurfaceConfig, TargetFlags};

/// A batched set of changes derived from [`WeekSurface::commit`].
#[derive(Clone, Debug, Default)]
pub struct SurfaceDamage {
    /// World-space rectangles that should be repainted.
    pub dirty_rects: Vec<Rect>,
}

impl SurfaceDamage {
    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }
}

/// Result of a hit test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    /// Index key of the matched target.
    pub key: Key,
    /// The matched target.
    pub target: DropTarget,
}

/// The interactive calendar week.
///
/// Wraps a grid-backed [`GridIndex`] whose cell size equals the visual
/// day-column width and hour-row height, so an hour slot is exactly one
/// cell. Construction pre-warms one droppable slot per `(day, hour)`; placed
/// blocks share the same index and are preferred by hit tests (they render
/// on top).
///
/// This is a coordinate-convention layer: day/hour and pixel offset/length
/// convert to canonical boxes here, and nothing else. Spatial logic lives in
/// `dropgrid_index`, time logic in `dropgrid_conflict`.
#[derive(Debug)]
pub struct WeekSurface {
    config: SurfaceConfig,
    index: GridIndex<DropTarget>,
    slot_keys: Vec<Key>,
    slot_flags: Vec<TargetFlags>,
    blocks: BTreeMap<ItemId, (Key, TargetFlags)>,
}

impl WeekSurface {
    /// Create a surface and pre-warm the week grid.
    ///
    /// Slots are committed and queryable immediately.
    pub fn new(config: SurfaceConfig) -> Self {
        debug_assert!(
            config.start_hour < config.end_hour && config.days > 0,
            "degenerate surface"
        );
        let mut index = GridIndex::with_uniform_grid(config.day_width, config.hour_height);
        let hours = usize::from(config.hours());
        let mut slot_keys = Vec::with_capacity(usize::from(config.days) * hours);
        for day in 0..config.days {
            for hour in config.start_hour..config.end_hour {
                let rect = slot_rect(&config, day, hour);
                slot_keys.push(index.insert(rect_to_box(rect), DropTarget::HourSlot { day, hour }));
            }
        }
        let _ = index.commit();
        let slot_flags = alloc::vec![TargetFlags::default(); slot_keys.len()];
        Self {
            config,
            index,
            slot_keys,
            slot_flags,
            blocks: BTreeMap::new(),
        }
    }

    /// The surface geometry.
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Rectangle of an hour slot.
    pub fn slot_rect(&self, day: u8, hour: u8) -> Rect {
        slot_rect(&self.config, day, hour)
    }

    /// Rectangle for a block in a day column, from a vertical pixel offset
    /// and length.
    pub fn block_rect(&self, day: u8, offset_px: f64, length_px: f64) -> Rect {
        let x = f64::from(day) * self.config.day_width;
        Rect::new(
            x,
            offset_px,
            x + self.config.day_width,
            offset_px + length_px,
        )
    }

    /// The day column containing `x`, if inside the surface.
    pub fn day_at(&self, x: f64) -> Option<u8> {
        if x < 0.0 || x >= self.config.width() {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "bounds-checked above; day count fits u8"
        )]
        let day = (x / self.config.day_width) as u8;
        Some(day)
    }

    /// Convert a day column and vertical pixel span to a time range in
    /// minutes from the week start, rounded to whole minutes.
    pub fn range_at(&self, day: u8, offset_px: f64, length_px: f64) -> TimeRange {
        let base = Minutes::from(day) * DAY_MIN + Minutes::from(self.config.start_hour) * 60;
        let start = base + px_to_minutes(offset_px, self.config.hour_height);
        let end = base + px_to_minutes(offset_px + length_px, self.config.hour_height);
        TimeRange::new(start, end.max(start))
    }

    /// Place or move an item's block. Visible to queries after
    /// [`commit`](Self::commit).
    pub fn place_block(&mut self, item: ItemId, day: u8, offset_px: f64, length_px: f64) {
        let bounds = rect_to_box(self.block_rect(day, offset_px, length_px));
        match self.blocks.get(&item) {
            Some(&(key, _)) => self.index.update(key, bounds),
            None => {
                let key = self.index.insert(bounds, DropTarget::Block { item });
                self.blocks.insert(item, (key, TargetFlags::default()));
            }
        }
    }

    /// Remove an item's block, if placed.
    pub fn remove_block(&mut self, item: ItemId) {
        if let Some((key, _)) = self.blocks.remove(&item) {
            self.index.remove(key);
        }
    }

    /// Whether the item currently has a (possibly uncommitted) block.
    pub fn has_block(&self, item: ItemId) -> bool {
        self.blocks.contains_key(&item)
    }

    /// The index key of an hour slot, stable for the surface's lifetime.
    pub fn slot_key(&self, day: u8, hour: u8) -> Option<Key> {
        self.slot_index(day, hour).map(|i| self.slot_keys[i])
    }

    /// Mark an hour slot as accepting drops or not.
    ///
    /// The surface does not infer occupancy; the embedder syncs this from
    /// its own schedule state when a slot fills up or frees.
    pub fn set_slot_droppable(&mut self, day: u8, hour: u8, droppable: bool) {
        if let Some(i) = self.slot_index(day, hour) {
            self.slot_flags[i].set(TargetFlags::DROPPABLE, droppable);
        }
    }

    /// Commit pending placements and removals, returning repaint damage.
    ///
    /// All mutations since the previous commit become visible to queries at
    /// once; a query can never observe half of a gesture's batch.
    pub fn commit(&mut self) -> SurfaceDamage {
        let damage = self.index.commit();
        let mut dirty_rects = Vec::with_capacity(
            damage.added.len() + damage.removed.len() + damage.moved.len() * 2,
        );
        for b in damage.added.iter().chain(damage.removed.iter()) {
            dirty_rects.push(box_to_rect(*b));
        }
        for (old, new) in &damage.moved {
            dirty_rects.push(box_to_rect(*old));
            dirty_rects.push(box_to_rect(*new));
        }
        SurfaceDamage { dirty_rects }
    }

    /// The topmost target at a point. Blocks win over the slot under them.
    pub fn hit_test(&self, pt: Point, filter: QueryFilter) -> Option<Hit> {
        let mut slot_hit = None;
        for (key, target) in self.index.query_point(pt.x, pt.y) {
            if !self.passes(target, filter) {
                continue;
            }
            match target {
                DropTarget::Block { .. } => return Some(Hit { key, target }),
                DropTarget::HourSlot { .. } => slot_hit = Some(Hit { key, target }),
            }
        }
        slot_hit
    }

    /// Targets intersecting a rectangle, filtered.
    pub fn targets_in_rect(&self, rect: Rect, filter: QueryFilter) -> Vec<(Key, DropTarget)> {
        self.index
            .query_rect(rect_to_box(rect))
            .filter(|&(_, target)| self.passes(target, filter))
            .collect()
    }

    /// Droppable hour slots near a point, nearest first.
    ///
    /// This is the highlight set while a drag hovers: the renderer lights up
    /// the returned slots in order.
    pub fn nearby_slots(&self, pt: Point, radius: f64) -> Vec<(DropTarget, f64)> {
        self.index
            .query_radius(pt.x, pt.y, radius)
            .into_iter()
            .filter(|&(_, target, _)| {
                matches!(target, DropTarget::HourSlot { .. })
                    && self.flags_of(target).contains(TargetFlags::DROPPABLE)
            })
            .map(|(_, target, d)| (target, d))
            .collect()
    }

    /// Evaluate a drop: convert the pixel placement to a time range and
    /// check it against the scheduled-item snapshot. `exclude` keeps an
    /// item's own prior placement from blocking it.
    pub fn check_drop(
        &self,
        day: u8,
        offset_px: f64,
        length_px: f64,
        items: &[ScheduledItem<ItemId>],
        exclude: Option<ItemId>,
    ) -> ConflictReport<ItemId> {
        check_conflict(self.range_at(day, offset_px, length_px), items, exclude)
    }

    /// Index statistics, for tuning the cell size.
    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }

    // --- internals ---

    fn slot_index(&self, day: u8, hour: u8) -> Option<usize> {
        if day >= self.config.days || hour < self.config.start_hour || hour >= self.config.end_hour
        {
            return None;
        }
        Some(
            usize::from(day) * usize::from(self.config.hours())
                + usize::from(hour - self.config.start_hour),
        )
    }

    fn flags_of(&self, target: DropTarget) -> TargetFlags {
        match target {
            DropTarget::HourSlot { day, hour } => self
                .slot_index(day, hour)
                .map(|i| self.slot_flags[i])
                .unwrap_or(TargetFlags::empty()),
            DropTarget::Block { item } => self
                .blocks
                .get(&item)
                .map(|&(_, flags)| flags)
                .unwrap_or(TargetFlags::empty()),
        }
    }

    fn passes(&self, target: DropTarget, filter: QueryFilter) -> bool {
        let flags = self.flags_of(target);
        if filter.visible_only && !flags.contains(TargetFlags::VISIBLE) {
            return false;
        }
        if filter.droppable_only && !flags.contains(TargetFlags::DROPPABLE) {
            return false;
        }
        true
    }
}

fn slot_rect(config: &SurfaceConfig, day: u8, hour: u8) -> Rect {
    let x = f64::from(day) * config.day_width;
    let y = f64::from(hour - config.start_hour) * config.hour_height;
    Rect::new(x, y, x + config.day_width, y + config.hour_height)
}

fn rect_to_box(r: Rect) -> Box2D {
    Box2D::new(r.x0, r.y0, r.x1, r.y1)
}

fn box_to_rect(b: Box2D) -> Rect {
    Rect::new(b.min_x, b.min_y, b.max_x, b.max_y)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "minute counts fit i64 by construction"
)]
fn px_to_minutes(px: f64, hour_height: f64) -> Minutes {
    (px / hour_height * 60.0 + 0.5) as Minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> WeekSurface {
        WeekSurface::new(SurfaceConfig::default())
    }

    #[test]
    fn prewarm_fills_the_week() {
        let s = surface();
        assert_eq!(s.stats().entries, 7 * 24);
        assert_eq!(s.stats().pending, 0, "slots are committed in new()");
    }

    #[test]
    fn hit_test_finds_the_right_slot() {
        let s = surface();
        let hit = s
            .hit_test(Point::new(250.0, 90.0), QueryFilter::default())
            .expect("inside the surface");
        assert_eq!(hit.target, DropTarget::HourSlot { day: 1, hour: 1 });
    }

    #[test]
    fn block_wins_over_slot_under_it() {
        let mut s = surface();
        let item = ItemId(9);
        s.place_block(item, 1, 60.0, 120.0);
        let _ = s.commit();
        let hit = s
            .hit_test(Point::new(250.0, 90.0), QueryFilter::default())
            .expect("hit");
        assert_eq!(hit.target, DropTarget::Block { item });
    }

    #[test]
    fn placement_invisible_until_commit() {
        let mut s = surface();
        let item = ItemId(1);
        s.place_block(item, 0, 0.0, 60.0);
        let hit = s.hit_test(Point::new(10.0, 10.0), QueryFilter::default());
        assert!(matches!(
            hit.map(|h| h.target),
            Some(DropTarget::HourSlot { .. })
        ));
        let damage = s.commit();
        assert!(!damage.dirty_rects.is_empty());
        let hit = s.hit_test(Point::new(10.0, 10.0), QueryFilter::default());
        assert_eq!(hit.map(|h| h.target), Some(DropTarget::Block { item }));
    }

    #[test]
    fn moving_a_block_damages_both_positions() {
        let mut s = surface();
        let item = ItemId(2);
        s.place_block(item, 0, 0.0, 60.0);
        let _ = s.commit();
        s.place_block(item, 3, 300.0, 60.0);
        let damage = s.commit();
        let union = damage.union_rect().expect("moved");
        assert!(union.x0 <= 0.0 + 1e-9);
        assert!(union.x1 >= 4.0 * 200.0 - 1e-9);
    }

    #[test]
    fn remove_block_vacates_after_commit() {
        let mut s = surface();
        let item = ItemId(3);
        s.place_block(item, 2, 120.0, 60.0);
        let _ = s.commit();
        s.remove_block(item);
        let _ = s.commit();
        let hit = s.hit_test(Point::new(450.0, 150.0), QueryFilter::default());
        assert!(matches!(
            hit.map(|h| h.target),
            Some(DropTarget::HourSlot { .. })
        ));
        assert!(!s.has_block(item));
    }

    #[test]
    fn nearby_slots_are_sorted_and_respect_droppable() {
        let mut s = surface();
        let filterless = s.nearby_slots(Point::new(100.0, 30.0), 200.0);
        assert!(!filterless.is_empty());
        for pair in filterless.windows(2) {
            assert!(pair[0].1 <= pair[1].1, "nearest first");
        }
        // The nearest slot is (0, 0); disable it and it disappears.
        assert_eq!(filterless[0].0, DropTarget::HourSlot { day: 0, hour: 0 });
        s.set_slot_droppable(0, 0, false);
        let filtered = s.nearby_slots(Point::new(100.0, 30.0), 200.0);
        assert!(
            !filtered
                .iter()
                .any(|&(t, _)| t == DropTarget::HourSlot { day: 0, hour: 0 })
        );
    }

    #[test]
    fn range_at_converts_pixels_to_minutes() {
        let s = surface();
        // Day 1, 90px down at 60px/hour = 1:30, 120px long = 2h.
        let range = s.range_at(1, 90.0, 120.0);
        assert_eq!(range, TimeRange::new(DAY_MIN + 90, DAY_MIN + 210));
    }

    #[test]
    fn check_drop_uses_exclusive_boundaries() {
        let s = surface();
        let existing = [ScheduledItem {
            id: ItemId(1),
            start: 10 * 60,
            end: Some(11 * 60),
        }];
        // 10:00-11:00 drop over a 10:00-11:00 item: conflict.
        let report = s.check_drop(0, 600.0, 60.0, &existing, None);
        assert!(report.has_conflict());
        // 11:00-12:00 drop: touching, no conflict.
        let report = s.check_drop(0, 660.0, 60.0, &existing, None);
        assert!(!report.has_conflict());
        // Same placement excluded by id: no self-conflict.
        let report = s.check_drop(0, 600.0, 60.0, &existing, Some(ItemId(1)));
        assert!(!report.has_conflict());
    }

    #[test]
    fn day_at_bounds() {
        let s = surface();
        assert_eq!(s.day_at(-1.0), None);
        assert_eq!(s.day_at(0.0), Some(0));
        assert_eq!(s.day_at(1399.0), Some(6));
        assert_eq!(s.day_at(1400.0), None);
    }
}
