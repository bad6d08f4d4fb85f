// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations.
//!
//! Two strategies with one contract, so callers can swap without API churn:
//!
//! - [`grid::UniformGrid`]: fixed-size cells; great locality and trivial
//!   tuning when objects are regularly distributed over a bounded surface
//!   (the calendar week). Choose the cell size so most boxes fall within a
//!   handful of cells.
//! - [`quadtree::QuadTree`]: adapts to sharply uneven density and unbounded
//!   surfaces by subdividing only where items accumulate, bounded by
//!   `max_items` per node and `max_level` depth.

pub mod grid;
pub mod quadtree;
