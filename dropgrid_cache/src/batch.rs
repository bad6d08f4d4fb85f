// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-batched invalidation: one cache pass per frame, however many
//! invalidation requests arrived.

use core::fmt::Debug;
use core::hash::Hash;

use dropgrid_timing::{Clock, FramePacer, Millis};
use hashbrown::HashSet;

use crate::cache::PositionCache;

/// Collects invalidation requests and applies them in a single pass at the
/// next frame boundary.
///
/// During a drag, one mutation commonly fans out into many invalidations
/// (every attendee tag, the item itself, the hovered slot). Applying each
/// immediately would rescan the cache N times per frame; the batcher
/// deduplicates them into two sets and walks the cache once.
#[derive(Debug)]
pub struct InvalidationBatcher<Id, D> {
    deps: HashSet<D>,
    items: HashSet<Id>,
    pacer: FramePacer,
    deadline: Option<Millis>,
}

impl<Id, D> InvalidationBatcher<Id, D>
where
    Id: Copy + Eq + Hash + Debug,
    D: Clone + Eq + Hash,
{
    /// Create a batcher flushing on the given pacer's frame boundaries.
    pub fn new(pacer: FramePacer) -> Self {
        Self {
            deps: HashSet::new(),
            items: HashSet::new(),
            pacer,
            deadline: None,
        }
    }

    /// Queue a dependency-key invalidation. Duplicate requests within one
    /// frame collapse into one.
    pub fn request_dependency(&mut self, dep: D, now: Millis) {
        self.deps.insert(dep);
        self.arm(now);
    }

    /// Queue a whole-item invalidation.
    pub fn request_item(&mut self, id: Id, now: Millis) {
        self.items.insert(id);
        self.arm(now);
    }

    /// True once the frame boundary for the pending batch has passed.
    pub fn is_due(&self, now: Millis) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Number of distinct pending requests.
    pub fn pending(&self) -> usize {
        self.deps.len() + self.items.len()
    }

    /// Apply every pending invalidation to `cache` in one pass and disarm.
    /// Returns the number of entries removed.
    ///
    /// The caller decides when: typically on [`is_due`](Self::is_due) at the
    /// top of a frame, or unconditionally on drag end.
    pub fn flush<C: Clock>(&mut self, cache: &mut PositionCache<Id, D, C>) -> usize {
        let mut removed = 0;
        for dep in self.deps.drain() {
            removed += cache.invalidate_dependency(&dep);
        }
        for id in self.items.drain() {
            removed += cache.invalidate_item(id);
        }
        self.deadline = None;
        removed
    }

    fn arm(&mut self, now: Millis) {
        if self.deadline.is_none() {
            self.deadline = Some(self.pacer.next_frame(now));
        }
    }
}
