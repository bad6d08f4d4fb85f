// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the surface: item identity, drop targets, flags, and
//! configuration.

/// Identifier for a schedulable item.
///
/// A small, copyable handle. Embedders with string ids intern them to this
/// at the boundary; the engine never parses identity out of strings.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ItemId(pub u64);

/// What a region of the surface is.
///
/// The block/slot distinction is an explicit variant, not an id prefix:
/// dependency derivation and hit-test handling match on this enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// An hour cell of the week grid, droppable when free.
    HourSlot {
        /// Day column, 0-based from the week start.
        day: u8,
        /// Hour row, 0-23.
        hour: u8,
    },
    /// A placed block belonging to an item.
    Block {
        /// The owning item.
        item: ItemId,
    },
}

bitflags::bitflags! {
    /// Target flags controlling visibility and drop eligibility.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TargetFlags: u8 {
        /// Target participates in rendering and rect queries.
        const VISIBLE   = 0b0000_0001;
        /// Target accepts drops (hour slots; cleared while a slot is covered).
        const DROPPABLE = 0b0000_0010;
    }
}

impl Default for TargetFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::DROPPABLE
    }
}

/// Filters applied during hit testing and queries.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, only consider targets flagged [`TargetFlags::VISIBLE`].
    pub visible_only: bool,
    /// If true, only consider targets flagged [`TargetFlags::DROPPABLE`].
    pub droppable_only: bool,
}

/// Geometry of the visible week.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// Day columns, usually 7.
    pub days: u8,
    /// Column width in pixels.
    pub day_width: f64,
    /// Height of one hour row in pixels; also the grid cell size.
    pub hour_height: f64,
    /// First visible hour (inclusive).
    pub start_hour: u8,
    /// Last visible hour (exclusive).
    pub end_hour: u8,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            days: 7,
            day_width: 200.0,
            hour_height: 60.0,
            start_hour: 0,
            end_hour: 24,
        }
    }
}

impl SurfaceConfig {
    /// Visible hours per day.
    pub fn hours(&self) -> u8 {
        self.end_hour - self.start_hour
    }

    /// Total surface width in pixels.
    pub fn width(&self) -> f64 {
        f64::from(self.days) * self.day_width
    }

    /// Total surface height in pixels.
    pub fn height(&self) -> f64 {
        f64::from(self.hours()) * self.hour_height
    }
}
