// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag session tracking: which item is in flight, movement deltas, and
//! total offsets from the grab point.
//!
//! The UI layer emits drag-lifecycle signals (start/move/end); this helper
//! turns the raw positions into the deltas the scheduler and surface
//! consume. One session per pointer.

use kurbo::{Point, Vec2};

use crate::types::ItemId;

/// Tracks one item's drag gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragSession {
    item: Option<ItemId>,
    start_pos: Option<Point>,
    last_pos: Option<Point>,
}

impl DragSession {
    /// Begin dragging `item` from `pos`. An in-flight session is replaced.
    pub fn start(&mut self, item: ItemId, pos: Point) {
        self.item = Some(item);
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
    }

    /// Record a move, returning the delta since the previous position.
    ///
    /// Returns `None` when no drag is active; stray move events after an
    /// `end` are ignored rather than guarded by the caller.
    pub fn update(&mut self, pos: Point) -> Option<Vec2> {
        self.item?;
        let last = self.last_pos.replace(pos);
        last.map(|l| pos - l)
    }

    /// Total offset from the grab point to `current_pos`.
    pub fn total_offset(&self, current_pos: Point) -> Option<Vec2> {
        self.start_pos.map(|s| current_pos - s)
    }

    /// End the gesture, returning the item that was dragged so the caller
    /// can resolve its drop synchronously.
    pub fn end(&mut self) -> Option<ItemId> {
        self.start_pos = None;
        self.last_pos = None;
        self.item.take()
    }

    /// The item in flight, if any.
    pub fn item(&self) -> Option<ItemId> {
        self.item
    }

    /// True while a drag is active.
    pub fn is_dragging(&self) -> bool {
        self.item.is_some()
    }
}
