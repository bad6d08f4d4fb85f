// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=dropgrid_surface --heading-base-level=0

//! Dropgrid Surface: a Kurbo-native calendar week over the spatial index.
//!
//! This crate is the coordinate-convention layer of the engine. It owns no
//! spatial or temporal logic of its own: boxes come from
//! [`dropgrid_index`], overlap semantics from [`dropgrid_conflict`]. What it
//! adds is the week's geometry — day columns, hour rows, pixel spans — and
//! a pre-warmed grid of drop targets.
//!
//! - [`WeekSurface::new`] pre-populates one droppable [`DropTarget::HourSlot`]
//!   per `(day, hour)`, with the index cell size tuned to the visual row
//!   height so a slot is exactly one cell.
//! - Blocks ([`DropTarget::Block`]) are placed from `(day, offset, length)`
//!   pixel spans and preferred by hit tests.
//! - [`WeekSurface::nearby_slots`] is the highlight set while a drag hovers;
//!   [`WeekSurface::check_drop`] converts a pixel placement to minutes and
//!   runs the conflict check.
//! - [`WeekSurface::commit`] applies a frame's batch atomically and returns
//!   repaint damage.
//!
//! # Example
//!
//! ```
//! use dropgrid_surface::{DropTarget, ItemId, QueryFilter, SurfaceConfig, WeekSurface};
//! use kurbo::Point;
//!
//! let mut surface = WeekSurface::new(SurfaceConfig::default());
//!
//! // Drop an hour-long block at Tuesday 10:00 (600px down at 60px/hour).
//! surface.place_block(ItemId(7), 1, 600.0, 60.0);
//! let damage = surface.commit();
//! assert!(!damage.dirty_rects.is_empty());
//!
//! // The block is now the topmost hit.
//! let hit = surface.hit_test(Point::new(250.0, 630.0), QueryFilter::default()).unwrap();
//! assert_eq!(hit.target, DropTarget::Block { item: ItemId(7) });
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod drag;
pub mod surface;
pub mod types;

pub use drag::DragSession;
pub use surface::{Hit, SurfaceDamage, WeekSurface};
pub use types::{DropTarget, ItemId, QueryFilter, SurfaceConfig, TargetFlags};
