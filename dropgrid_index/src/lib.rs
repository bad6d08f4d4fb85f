// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=dropgrid_index --heading-base-level=0

//! Dropgrid Index: a 2D AABB index for interactive surfaces.
//!
//! Dropgrid Index answers "what is near this point?" while items are dragged
//! across a time-gridded surface, within a per-frame budget.
//!
//! - Insert, update, and remove axis-aligned boxes with user payloads.
//! - Query by point, intersecting rectangle, or radius (nearest first).
//! - Batch mutations with [`IndexGeneric::commit`] and receive coarse damage
//!   (added/removed/moved boxes) for repaint.
//!
//! Backends are pluggable via a simple trait so you can swap the spatial
//! strategy without API churn. [`UniformGrid`] buckets boxes into fixed-size
//! cells and fits a regular, bounded surface; [`QuadTree`] subdivides
//! adaptively and fits free-form canvases where density varies sharply.
//!
//! Boxes are half-open: two boxes touching only at an edge do not intersect,
//! so back-to-back calendar rows never report phantom overlaps.
//!
//! # Example
//!
//! ```rust
//! use dropgrid_index::{Box2D, GridIndex};
//!
//! // A grid index with 60px cells, matching the visual row height.
//! let mut idx: GridIndex<u32> = GridIndex::with_uniform_grid(60.0, 60.0);
//! let a = idx.insert(Box2D::from_xywh(0.0, 0.0, 200.0, 60.0), 1);
//! let b = idx.insert(Box2D::from_xywh(0.0, 30.0, 200.0, 60.0), 2);
//! let _damage0 = idx.commit();
//!
//! // Both items intersect the band, each reported once.
//! let hits: Vec<_> = idx.query_rect(Box2D::from_xywh(0.0, 0.0, 200.0, 90.0)).collect();
//! assert_eq!(hits.len(), 2);
//!
//! // Move the first item and collect damage for repaint.
//! idx.update(a, Box2D::from_xywh(0.0, 120.0, 200.0, 60.0));
//! let damage = idx.commit();
//! assert!(!damage.is_empty());
//! # let _ = (a, b);
//! ```
//!
//! The quadtree variant has the same contract:
//!
//! ```rust
//! use dropgrid_index::{Box2D, QuadIndex};
//!
//! let mut idx: QuadIndex<u32> =
//!     QuadIndex::with_quadtree(Box2D::from_xywh(0.0, 0.0, 2048.0, 2048.0));
//! let _k = idx.insert(Box2D::from_xywh(10.0, 10.0, 50.0, 50.0), 1);
//! let _ = idx.commit();
//!
//! let near = idx.query_radius(0.0, 0.0, 100.0);
//! assert_eq!(near.len(), 1);
//! ```
//!
//! ## Choosing a backend
//!
//! - [`UniformGrid`]: O(1)-ish neighborhood lookups when objects are
//!   regularly distributed across a fixed-size surface. Removal scans all
//!   cells, acceptable while the cell count stays small relative to the
//!   object count.
//! - [`QuadTree`]: keeps queries cheap under clustered or unbounded input;
//!   carries a slot-to-box side table so removal never searches the tree.
//!
//! ## Float semantics
//!
//! This crate assumes no NaNs in coordinates. Debug builds may assert.
//! Radius queries need a square root: the default `std` feature uses the
//! platform one, or enable `libm` for `no_std` builds.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod damage;
pub mod index;
pub mod types;

pub use backend::{Backend, BackendStats};
pub use backends::grid::UniformGrid;
pub use backends::quadtree::QuadTree;
pub use damage::Damage;
pub use index::{GridIndex, IndexGeneric, IndexStats, Key, QuadIndex};
pub use types::Box2D;
