// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend: fixed-size cells over a mostly regular surface.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::backend::{Backend, BackendStats};
use crate::types::Box2D;

/// Uniform grid backend.
///
/// Buckets boxes into fixed-size cells keyed by floor division of the
/// coordinates. An object whose box spans a cell boundary is listed in every
/// covered cell; queries de-duplicate before yielding. Best suited to
/// regularly distributed objects on a bounded surface, such as a calendar
/// week grid where the cell size matches the visual row height.
///
/// Removal scans all cells. That is acceptable while `objects × spanned
/// cells` stays small (the intended regime); for sharply uneven density or
/// unbounded surfaces prefer [`QuadTree`](crate::QuadTree), which carries a
/// slot-to-box side table instead.
pub struct UniformGrid {
    cell_w: f64,
    cell_h: f64,
    origin_x: f64,
    origin_y: f64,
    entries: Vec<Option<Box2D>>,
    cells: Vec<(i64, i64, SmallVec<[usize; 8]>)>,
}

impl UniformGrid {
    /// Create a grid backend with the given cell size, origin at `(0, 0)`.
    pub fn new(cell_w: f64, cell_h: f64) -> Self {
        Self::with_origin(cell_w, cell_h, 0.0, 0.0)
    }

    /// Create a grid backend with the given cell size and origin offset.
    ///
    /// Coordinates are mapped to integer cell indices by floor-division of
    /// `(x - origin_x) / cell_w` and `(y - origin_y) / cell_h`.
    pub fn with_origin(cell_w: f64, cell_h: f64, origin_x: f64, origin_y: f64) -> Self {
        debug_assert!(cell_w > 0.0 && cell_h > 0.0, "cell sizes must be positive");
        Self {
            cell_w,
            cell_h,
            origin_x,
            origin_y,
            entries: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Drop cells left empty by removals and updates.
    ///
    /// Never required for correctness; call it after bursts of churn to keep
    /// the cell scan short.
    pub fn optimize(&mut self) {
        self.cells.retain(|(_, _, slots)| !slots.is_empty());
    }

    #[inline]
    fn floor_to_i64(v: f64) -> i64 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "cell indices are intentionally i64; coordinates this large are out of scope"
        )]
        let i = v as i64;
        if (i as f64) > v { i - 1 } else { i }
    }

    fn key_for(&self, x: f64, y: f64) -> (i64, i64) {
        let cx = Self::floor_to_i64((x - self.origin_x) / self.cell_w);
        let cy = Self::floor_to_i64((y - self.origin_y) / self.cell_h);
        (cx, cy)
    }

    /// Inclusive cell range covered by a half-open box.
    ///
    /// A max edge sitting exactly on a cell boundary does not spill into the
    /// next cell.
    fn cell_range(&self, b: &Box2D) -> (i64, i64, i64, i64) {
        let (x0, y0) = self.key_for(b.min_x, b.min_y);
        let (mut x1, mut y1) = self.key_for(b.max_x, b.max_y);
        if x1 > x0 && (b.max_x - self.origin_x) == (x1 as f64) * self.cell_w {
            x1 -= 1;
        }
        if y1 > y0 && (b.max_y - self.origin_y) == (y1 as f64) * self.cell_h {
            y1 -= 1;
        }
        (x0, y0, x1.max(x0), y1.max(y0))
    }

    fn cells_for_box(&self, b: &Box2D) -> Vec<(i64, i64)> {
        let (x0, y0, x1, y1) = self.cell_range(b);
        let mut out = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                out.push((x, y));
            }
        }
        out
    }

    fn find_cell_mut(&mut self, key: (i64, i64)) -> usize {
        if let Some((idx, _)) = self
            .cells
            .iter()
            .enumerate()
            .find(|(_, (cx, cy, _))| (*cx, *cy) == key)
        {
            idx
        } else {
            self.cells.push((key.0, key.1, SmallVec::new()));
            self.cells.len() - 1
        }
    }

    fn remove_from_cells(&mut self, slot: usize) {
        for (_, _, slots) in &mut self.cells {
            if let Some(pos) = slots.iter().position(|&s| s == slot) {
                slots.swap_remove(pos);
            }
        }
    }

    fn insert_into_cells(&mut self, slot: usize, bounds: Box2D) {
        for key in self.cells_for_box(&bounds) {
            let idx = self.find_cell_mut(key);
            self.cells[idx].2.push(slot);
        }
    }
}

impl Backend for UniformGrid {
    fn insert(&mut self, slot: usize, bounds: Box2D) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(bounds);
        self.insert_into_cells(slot, bounds);
    }

    fn update(&mut self, slot: usize, bounds: Box2D) {
        self.remove_from_cells(slot);
        if let Some(e) = self.entries.get_mut(slot) {
            *e = Some(bounds);
            self.insert_into_cells(slot, bounds);
        }
    }

    fn remove(&mut self, slot: usize) {
        self.remove_from_cells(slot);
        if let Some(e) = self.entries.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.cells.clear();
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        let key = self.key_for(x, y);
        let mut set = BTreeSet::new();
        if let Some((_, _, slots)) = self.cells.iter().find(|(cx, cy, _)| (*cx, *cy) == key) {
            for &s in slots {
                if let Some(Some(b)) = self.entries.get(s)
                    && b.contains_point(x, y)
                {
                    set.insert(s);
                }
            }
        }
        Box::new(set.into_iter())
    }

    fn query_rect<'a>(&'a self, rect: Box2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        // Candidates from covered cells, then the exact half-open test; an
        // object spanning several queried cells is yielded once.
        let mut set = BTreeSet::new();
        for key in self.cells_for_box(&rect) {
            if let Some((_, _, slots)) = self.cells.iter().find(|(cx, cy, _)| (*cx, *cy) == key) {
                for &s in slots {
                    if let Some(Some(b)) = self.entries.get(s)
                        && b.intersects(&rect)
                    {
                        set.insert(s);
                    }
                }
            }
        }
        Box::new(set.into_iter())
    }

    fn stats(&self) -> BackendStats {
        let objects = self.entries.iter().filter(|e| e.is_some()).count();
        let occupied = self
            .cells
            .iter()
            .filter(|(_, _, slots)| !slots.is_empty())
            .count();
        let listed: usize = self.cells.iter().map(|(_, _, slots)| slots.len()).sum();
        let mean_occupancy = if occupied == 0 {
            0.0
        } else {
            listed as f64 / occupied as f64
        };
        BackendStats {
            objects,
            buckets: occupied,
            max_depth: 1,
            mean_occupancy,
        }
    }
}

impl core::fmt::Debug for UniformGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        let cells = self.cells.len();
        f.debug_struct("UniformGrid")
            .field("cell_w", &self.cell_w)
            .field("cell_h", &self.cell_h)
            .field("origin_x", &self.origin_x)
            .field("origin_y", &self.origin_y)
            .field("total_slots", &total)
            .field("alive", &alive)
            .field("cells", &cells)
            .finish_non_exhaustive()
    }
}
