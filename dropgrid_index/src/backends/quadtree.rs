// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive quadtree backend for unevenly distributed objects.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::backend::{Backend, BackendStats};
use crate::types::Box2D;

/// A quadtree node: either a leaf holding items directly, or an interior
/// node with four children plus the items that straddle a split line.
#[derive(Debug)]
struct Node {
    bounds: Box2D,
    items: SmallVec<[(usize, Box2D); 4]>,
    children: Option<Box<[Node; 4]>>,
    level: usize,
}

impl Node {
    fn new(bounds: Box2D, level: usize) -> Self {
        Self {
            bounds,
            items: SmallVec::new(),
            children: None,
            level,
        }
    }

    /// The child quadrant that fully contains `b`, if any.
    ///
    /// Uses the half-open split convention: a box whose edge sits exactly on
    /// a split line belongs to the higher quadrant only if its min does.
    fn child_for(&self, b: &Box2D) -> Option<usize> {
        let children = self.children.as_ref()?;
        children.iter().position(|c| c.bounds.contains_box(b))
    }

    fn subdivide(&mut self) {
        let (mx, my) = self.bounds.center();
        let b = &self.bounds;
        let level = self.level + 1;
        let mut children = Box::new([
            Node::new(Box2D::new(b.min_x, b.min_y, mx, my), level),
            Node::new(Box2D::new(mx, b.min_y, b.max_x, my), level),
            Node::new(Box2D::new(b.min_x, my, mx, b.max_y), level),
            Node::new(Box2D::new(mx, my, b.max_x, b.max_y), level),
        ]);
        // Push down items that now fit a single child; straddlers stay here.
        let items = core::mem::take(&mut self.items);
        for (slot, bounds) in items {
            match children.iter().position(|c| c.bounds.contains_box(&bounds)) {
                Some(ci) => children[ci].items.push((slot, bounds)),
                None => self.items.push((slot, bounds)),
            }
        }
        self.children = Some(children);
    }

    /// Insert, subdividing when the item count exceeds `max_items` and depth
    /// allows. `max_items`/`max_level` are threaded down because nodes do not
    /// keep a backpointer to the tree.
    fn insert(&mut self, slot: usize, bounds: Box2D, max_items: usize, max_level: usize) {
        if self.children.is_none()
            && self.items.len() >= max_items
            && self.level < max_level
        {
            self.subdivide();
        }
        match self.child_for(&bounds) {
            Some(ci) => self.children.as_mut().expect("child_for implies children")[ci].insert(
                slot,
                bounds,
                max_items,
                max_level,
            ),
            None => self.items.push((slot, bounds)),
        }
    }

    /// Remove by descending the same single-quadrant chain insertion used.
    fn remove(&mut self, slot: usize, bounds: &Box2D) -> bool {
        if let Some(ci) = self.child_for(bounds)
            && self.children.as_mut().expect("child_for implies children")[ci].remove(slot, bounds)
        {
            return true;
        }
        if let Some(pos) = self.items.iter().position(|&(s, _)| s == slot) {
            self.items.swap_remove(pos);
            return true;
        }
        false
    }

    fn query_rect(&self, rect: &Box2D, out: &mut BTreeSet<usize>) {
        for (slot, b) in &self.items {
            if b.intersects(rect) {
                out.insert(*slot);
            }
        }
        if let Some(children) = &self.children {
            for c in children.iter() {
                if c.bounds.intersects(rect) {
                    c.query_rect(rect, out);
                }
            }
        }
    }

    fn query_point(&self, x: f64, y: f64, out: &mut BTreeSet<usize>) {
        for (slot, b) in &self.items {
            if b.contains_point(x, y) {
                out.insert(*slot);
            }
        }
        if let Some(children) = &self.children {
            for c in children.iter() {
                if c.bounds.contains_point(x, y) {
                    c.query_point(x, y, out);
                }
            }
        }
    }

    fn visit_stats(&self, nodes: &mut usize, deepest: &mut usize, items: &mut usize) {
        *nodes += 1;
        *deepest = (*deepest).max(self.level + 1);
        *items += self.items.len();
        if let Some(children) = &self.children {
            for c in children.iter() {
                c.visit_stats(nodes, deepest, items);
            }
        }
    }
}

/// Adaptive quadtree backend.
///
/// A node subdivides into four equal quadrants once its item count exceeds
/// `max_items` and its depth is below `max_level`; items straddling a split
/// line remain at the parent. Queries recurse only into children whose
/// bounds intersect the query region and apply the exact half-open test at
/// every visited node.
///
/// A slot-to-box side table makes "is this slot tracked" O(1) and removal
/// O(depth), independent of tree shape — the alternative would be parent
/// pointers or a full-tree search. Update is remove-then-reinsert.
///
/// Preferred over [`UniformGrid`](crate::UniformGrid) when object density is
/// sharply uneven or the surface is unbounded; items outside the root bounds
/// are kept at the root as straddlers, so queries remain correct either way.
#[derive(Debug)]
pub struct QuadTree {
    root: Node,
    max_items: usize,
    max_level: usize,
    entries: Vec<Option<Box2D>>,
}

/// Default split threshold per node.
pub const DEFAULT_MAX_ITEMS: usize = 8;
/// Default depth bound.
pub const DEFAULT_MAX_LEVEL: usize = 6;

impl QuadTree {
    /// Create a quadtree over the given root bounds with default tuning.
    pub fn new(bounds: Box2D) -> Self {
        Self::with_limits(bounds, DEFAULT_MAX_ITEMS, DEFAULT_MAX_LEVEL)
    }

    /// Create a quadtree with explicit `max_items` / `max_level` tuning.
    pub fn with_limits(bounds: Box2D, max_items: usize, max_level: usize) -> Self {
        debug_assert!(max_items > 0, "max_items must be positive");
        Self {
            root: Node::new(bounds, 0),
            max_items,
            max_level,
            entries: Vec::new(),
        }
    }
}

impl Backend for QuadTree {
    fn insert(&mut self, slot: usize, bounds: Box2D) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(bounds);
        self.root.insert(slot, bounds, self.max_items, self.max_level);
    }

    fn update(&mut self, slot: usize, bounds: Box2D) {
        // Remove-then-reinsert: the stored box pins down which node chain the
        // slot lives in, so no search is needed.
        self.remove(slot);
        self.insert(slot, bounds);
    }

    fn remove(&mut self, slot: usize) {
        let Some(Some(bounds)) = self.entries.get(slot).copied() else {
            return;
        };
        let _ = self.root.remove(slot, &bounds);
        self.entries[slot] = None;
    }

    fn clear(&mut self) {
        let bounds = self.root.bounds;
        self.root = Node::new(bounds, 0);
        self.entries.clear();
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut set = BTreeSet::new();
        self.root.query_point(x, y, &mut set);
        Box::new(set.into_iter())
    }

    fn query_rect<'a>(&'a self, rect: Box2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut set = BTreeSet::new();
        self.root.query_rect(&rect, &mut set);
        Box::new(set.into_iter())
    }

    fn stats(&self) -> BackendStats {
        let (mut nodes, mut deepest, mut items) = (0, 0, 0);
        self.root.visit_stats(&mut nodes, &mut deepest, &mut items);
        let mean_occupancy = if nodes == 0 {
            0.0
        } else {
            items as f64 / nodes as f64
        };
        BackendStats {
            objects: items,
            buckets: nodes,
            max_depth: deepest,
            mean_occupancy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn tree() -> QuadTree {
        QuadTree::with_limits(Box2D::from_xywh(0.0, 0.0, 1024.0, 1024.0), 4, 5)
    }

    fn rect_hits(t: &QuadTree, r: Box2D) -> Vec<usize> {
        t.query_rect(r).collect()
    }

    #[test]
    fn leaf_splits_past_max_items() {
        let mut t = tree();
        for i in 0..5 {
            let x = i as f64 * 10.0;
            t.insert(i, Box2D::from_xywh(x, 0.0, 8.0, 8.0));
        }
        let s = t.stats();
        assert!(s.buckets > 1, "node should have subdivided");
        assert_eq!(s.objects, 5);
    }

    #[test]
    fn straddler_stays_at_parent() {
        let mut t = tree();
        // Crosses the vertical split line of the root once it subdivides.
        t.insert(0, Box2D::from_xywh(500.0, 500.0, 100.0, 100.0));
        for i in 1..6 {
            t.insert(i, Box2D::from_xywh(i as f64 * 20.0, 0.0, 8.0, 8.0));
        }
        assert!(
            t.root.items.iter().any(|&(s, _)| s == 0),
            "straddler must remain at the subdivided root"
        );
        assert_eq!(rect_hits(&t, Box2D::from_xywh(510.0, 510.0, 10.0, 10.0)), [0]);
    }

    #[test]
    fn depth_is_bounded() {
        let mut t = QuadTree::with_limits(Box2D::from_xywh(0.0, 0.0, 1024.0, 1024.0), 1, 3);
        // All in one corner; would subdivide forever without the level bound.
        for i in 0..16 {
            t.insert(i, Box2D::from_xywh(1.0, 1.0, 2.0, 2.0));
        }
        assert!(t.stats().max_depth <= 4);
    }

    #[test]
    fn remove_then_query_is_empty() {
        let mut t = tree();
        for i in 0..10 {
            t.insert(i, Box2D::from_xywh(i as f64 * 50.0, 0.0, 40.0, 40.0));
        }
        for i in 0..10 {
            t.remove(i);
        }
        assert!(rect_hits(&t, Box2D::from_xywh(0.0, 0.0, 1024.0, 1024.0)).is_empty());
        assert_eq!(t.stats().objects, 0);
    }

    #[test]
    fn update_moves_between_quadrants() {
        let mut t = tree();
        for i in 0..6 {
            t.insert(i, Box2D::from_xywh(i as f64 * 10.0, 0.0, 8.0, 8.0));
        }
        t.update(0, Box2D::from_xywh(900.0, 900.0, 8.0, 8.0));
        assert_eq!(rect_hits(&t, Box2D::from_xywh(890.0, 890.0, 30.0, 30.0)), [0]);
        assert!(!rect_hits(&t, Box2D::from_xywh(0.0, 0.0, 9.0, 9.0)).contains(&0));
    }

    #[test]
    fn item_outside_root_bounds_is_still_found() {
        let mut t = tree();
        t.insert(0, Box2D::from_xywh(2000.0, 2000.0, 10.0, 10.0));
        assert_eq!(rect_hits(&t, Box2D::from_xywh(1990.0, 1990.0, 30.0, 30.0)), [0]);
        t.remove(0);
        assert!(rect_hits(&t, Box2D::from_xywh(1990.0, 1990.0, 30.0, 30.0)).is_empty());
    }

    #[test]
    fn query_reflexivity_and_exactness() {
        let mut t = tree();
        let boxes: Vec<Box2D> = (0..20)
            .map(|i| {
                let x = (i % 5) as f64 * 37.0;
                let y = (i / 5) as f64 * 91.0;
                Box2D::from_xywh(x, y, 30.0, 30.0)
            })
            .collect();
        for (i, b) in boxes.iter().enumerate() {
            t.insert(i, *b);
        }
        for (i, b) in boxes.iter().enumerate() {
            let hits = rect_hits(&t, *b);
            assert!(hits.contains(&i), "query over own bounds must find the item");
            for h in hits {
                assert!(boxes[h].intersects(b), "no false positives");
            }
        }
    }
}
