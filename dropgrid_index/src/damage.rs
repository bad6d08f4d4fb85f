// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched damage structures returned by [`IndexGeneric::commit`](crate::IndexGeneric::commit).

use alloc::vec::Vec;

use crate::types::Box2D;

/// Batched damage summary returned by [`IndexGeneric::commit`](crate::IndexGeneric::commit).
///
/// The renderer uses this to bound repaint work after a frame's worth of
/// coalesced mutations: repaint the union, or walk the individual entries.
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Newly added boxes since last commit.
    pub added: Vec<Box2D>,
    /// Removed boxes since last commit.
    pub removed: Vec<Box2D>,
    /// Moved boxes since last commit: (old, new).
    pub moved: Vec<(Box2D, Box2D)>,
}

impl Damage {
    /// True if no damage entries recorded.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    /// Union of all boxes affected. Returns `None` if empty.
    pub fn union(&self) -> Option<Box2D> {
        let mut it = self
            .added
            .iter()
            .copied()
            .chain(self.removed.iter().copied())
            .chain(self.moved.iter().flat_map(|(a, b)| [*a, *b]));
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(&r)))
    }
}
