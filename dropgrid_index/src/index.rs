// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public index API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::{Backend, BackendStats};
use crate::backends::grid::UniformGrid;
use crate::backends::quadtree::QuadTree;
use crate::damage::Damage;
use crate::types::{Box2D, sqrt};

/// Generational handle for entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Added,
    Updated,
    Removed,
}

#[derive(Clone, Debug)]
struct Entry<P> {
    generation: u32,
    bounds: Box2D,
    payload: P,
    mark: Option<Mark>,
    prev_bounds: Option<Box2D>, // for moved damage
}

/// Aggregate statistics for an index: live/pending entry counts plus the
/// backend's occupancy numbers.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct IndexStats {
    /// Entries alive in the slot table (committed or pending-add).
    pub entries: usize,
    /// Entries with an uncommitted mark.
    pub pending: usize,
    /// Backend occupancy.
    pub backend: BackendStats,
}

/// A generic AABB index parameterized by a spatial backend.
///
/// Mutations (`insert`/`update`/`remove`) only mark the slot table; the
/// backend — and therefore every query — observes them atomically at the
/// next [`commit`](Self::commit), never partially in between. `commit`
/// returns the batched [`Damage`] for repaint.
#[derive(Debug)]
pub struct IndexGeneric<P: Copy + Debug, B: Backend> {
    entries: Vec<Option<Entry<P>>>,
    free_list: Vec<usize>,
    backend: B,
}

/// Index over the uniform grid backend, the fit for a regular calendar
/// surface.
pub type GridIndex<P> = IndexGeneric<P, UniformGrid>;

/// Index over the adaptive quadtree backend, the fit for free-form canvases
/// with uneven density.
pub type QuadIndex<P> = IndexGeneric<P, QuadTree>;

impl<P: Copy + Debug> GridIndex<P> {
    /// Create a grid-backed index with the given cell size (origin `(0, 0)`).
    pub fn with_uniform_grid(cell_w: f64, cell_h: f64) -> Self {
        Self::with_backend(UniformGrid::new(cell_w, cell_h))
    }

    /// Create a grid-backed index with an explicit origin offset.
    pub fn with_uniform_grid_and_origin(
        cell_w: f64,
        cell_h: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> Self {
        Self::with_backend(UniformGrid::with_origin(cell_w, cell_h, origin_x, origin_y))
    }
}

impl<P: Copy + Debug> QuadIndex<P> {
    /// Create a quadtree-backed index over the given root bounds.
    pub fn with_quadtree(bounds: Box2D) -> Self {
        Self::with_backend(QuadTree::new(bounds))
    }

    /// Create a quadtree-backed index with explicit split tuning.
    pub fn with_quadtree_limits(bounds: Box2D, max_items: usize, max_level: usize) -> Self {
        Self::with_backend(QuadTree::with_limits(bounds, max_items, max_level))
    }
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend,
{
    /// Create an index from a configured backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            backend,
        }
    }

    /// Reserve space for at least `n` entries.
    pub fn reserve(&mut self, n: usize) {
        self.entries.reserve(n);
    }

    /// Insert a new box with payload. Returns a stable handle [`Key`].
    ///
    /// Visible to queries after the next [`commit`](Self::commit).
    pub fn insert(&mut self, bounds: Box2D, payload: P) -> Key {
        debug_assert!(
            bounds.min_x <= bounds.max_x && bounds.min_y <= bounds.max_y,
            "inverted bounds are a caller error"
        );
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.entries[idx]
                .as_ref()
                .map(|e| e.generation)
                .unwrap_or(0)
                + 1;
            self.entries[idx] = Some(Entry {
                generation,
                bounds,
                payload,
                mark: Some(Mark::Added),
                prev_bounds: None,
            });
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.entries.push(Some(Entry {
                generation,
                bounds,
                payload,
                mark: Some(Mark::Added),
                prev_bounds: None,
            }));
            (self.entries.len() - 1, generation)
        };
        Key::new(idx, generation)
    }

    /// Update an existing entry's bounds.
    ///
    /// Correct whether the box grew, shrank, or moved; the backend reindexes
    /// the slot from scratch at commit. Stale keys are ignored.
    pub fn update(&mut self, key: Key, bounds: Box2D) {
        if let Some(e) = self.entry_mut(key) {
            if e.mark.is_none() {
                e.prev_bounds = Some(e.bounds);
            }
            e.bounds = bounds;
            e.mark = Some(match e.mark {
                Some(Mark::Added) => Mark::Added,
                _ => Mark::Updated,
            });
        }
    }

    /// Remove an existing entry. Stale keys are ignored.
    pub fn remove(&mut self, key: Key) {
        if let Some(e) = self.entry_mut(key) {
            if matches!(e.mark, Some(Mark::Added)) {
                self.entries[key.idx()] = None;
                self.free_list.push(key.idx());
            } else {
                e.mark = Some(Mark::Removed);
            }
        }
    }

    /// Current bounds of an entry, if the key is live.
    pub fn bounds(&self, key: Key) -> Option<Box2D> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        (e.generation == key.1).then_some(e.bounds)
    }

    /// Payload of an entry, if the key is live.
    pub fn payload(&self, key: Key) -> Option<P> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        (e.generation == key.1).then_some(e.payload)
    }

    /// Number of live entries, committed or pending.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// True if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate every live entry, in slot order.
    ///
    /// Backed by the slot table, not the backend, so it is independent of
    /// tree shape and includes entries whose insertion has not committed
    /// yet.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Box2D, P)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            e.as_ref()
                .map(|e| (Key::new(i, e.generation), e.bounds, e.payload))
        })
    }

    /// Clear the index (without reporting damage).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.free_list.clear();
        self.backend.clear();
    }

    /// Apply pending changes and compute batched damage. Also synchronizes
    /// backend state; queued mutations become visible to queries here, all
    /// at once.
    pub fn commit(&mut self) -> Damage {
        let mut dmg = Damage::default();
        for i in 0..self.entries.len() {
            let Some(entry) = self.entries[i].as_mut() else {
                continue;
            };
            match entry.mark.take() {
                Some(Mark::Added) => {
                    self.backend.insert(i, entry.bounds);
                    dmg.added.push(entry.bounds);
                }
                Some(Mark::Removed) => {
                    self.backend.remove(i);
                    dmg.removed.push(entry.bounds);
                    self.entries[i] = None;
                    self.free_list.push(i);
                }
                Some(Mark::Updated) => {
                    self.backend.update(i, entry.bounds);
                    if let Some(prev) = entry.prev_bounds.take()
                        && prev != entry.bounds
                    {
                        dmg.moved.push((prev, entry.bounds));
                    }
                }
                None => {}
            }
        }
        dmg
    }

    /// Query for entries whose box contains the point (half-open edges).
    pub fn query_point(&self, x: f64, y: f64) -> impl Iterator<Item = (Key, P)> + '_ {
        let slots = self.backend.query_point(x, y);
        let mut out = Vec::new();
        for i in slots {
            if let Some(Some(e)) = self.entries.get(i) {
                out.push((Key::new(i, e.generation), e.payload));
            }
        }
        out.into_iter()
    }

    /// Query for entries whose box intersects the given rectangle with
    /// positive area. Each entry is yielded at most once.
    pub fn query_rect(&self, rect: Box2D) -> impl Iterator<Item = (Key, P)> + '_ {
        let slots = self.backend.query_rect(rect);
        let mut out = Vec::new();
        for i in slots {
            if let Some(Some(e)) = self.entries.get(i) {
                out.push((Key::new(i, e.generation), e.payload));
            }
        }
        out.into_iter()
    }

    /// Query for entries whose center lies within `radius` of `(x, y)`.
    ///
    /// The circle is widened to its bounding square for the backend pass,
    /// then filtered by exact Euclidean center distance. Results are sorted
    /// nearest first; ties keep ascending slot order, independent of
    /// insertion history.
    pub fn query_radius(&self, x: f64, y: f64, radius: f64) -> Vec<(Key, P, f64)> {
        debug_assert!(radius >= 0.0, "radius must be non-negative");
        let square = Box2D::new(x - radius, y - radius, x + radius, y + radius);
        let mut out: Vec<(Key, P, f64)> = Vec::new();
        for i in self.backend.query_rect(square) {
            let Some(Some(e)) = self.entries.get(i) else {
                continue;
            };
            let (cx, cy) = e.bounds.center();
            let d = sqrt((cx - x) * (cx - x) + (cy - y) * (cy - y));
            if d <= radius {
                out.push((Key::new(i, e.generation), e.payload, d));
            }
        }
        out.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(core::cmp::Ordering::Equal));
        out
    }

    /// Entry counts and backend occupancy, for tuning.
    pub fn stats(&self) -> IndexStats {
        let entries = self.entries.iter().filter(|e| e.is_some()).count();
        let pending = self
            .entries
            .iter()
            .flatten()
            .filter(|e| e.mark.is_some())
            .count();
        IndexStats {
            entries,
            pending,
            backend: self.backend.stats(),
        }
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry<P>> {
        let e = self.entries.get_mut(key.idx())?.as_mut()?;
        if e.generation != key.1 {
            return None;
        }
        Some(e)
    }
}
