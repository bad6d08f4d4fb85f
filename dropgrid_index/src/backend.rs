// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use alloc::boxed::Box;

use crate::types::Box2D;

/// Occupancy statistics reported by a backend.
///
/// `buckets` counts occupied grid cells for [`UniformGrid`](crate::UniformGrid)
/// and allocated nodes for [`QuadTree`](crate::QuadTree); `max_depth` is
/// always 1 for the grid. These numbers exist for tuning cell size and
/// `max_items`/`max_level`, not for correctness.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BackendStats {
    /// Live objects tracked by the backend.
    pub objects: usize,
    /// Occupied cells (grid) or allocated nodes (quadtree).
    pub buckets: usize,
    /// Deepest level in use; 1 for flat backends.
    pub max_depth: usize,
    /// Mean objects per occupied bucket; 0 when empty.
    pub mean_occupancy: f64,
}

/// Spatial backend abstraction used by [`IndexGeneric`](crate::IndexGeneric).
///
/// Backends track `(slot, bounds)` pairs; payloads and identity live in the
/// front-end's slot table. All query results are yielded in ascending slot
/// order with no duplicates, even when an object occupies several internal
/// buckets.
pub trait Backend {
    /// Insert a new slot into the spatial structure.
    ///
    /// Inserting a slot that is already present is a caller error; the
    /// front-end never does so.
    fn insert(&mut self, slot: usize, bounds: Box2D);

    /// Update an existing slot's bounds.
    fn update(&mut self, slot: usize, bounds: Box2D);

    /// Remove a slot from the spatial structure.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Query slots whose box contains the point (half-open edges).
    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Query slots whose box intersects the rectangle with positive area.
    fn query_rect<'a>(&'a self, rect: Box2D) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Occupancy statistics for tuning.
    fn stats(&self) -> BackendStats;
}
