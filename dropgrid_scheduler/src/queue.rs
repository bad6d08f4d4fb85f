// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The coalescing update queue.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt::{self, Debug};
use core::hash::Hash;

use dropgrid_timing::{FramePacer, Millis};
use hashbrown::HashMap;

/// Execution priority; higher runs earlier within a category.
pub type Priority = i32;

/// Handle for a queued update, valid until it commits or is cancelled.
///
/// Re-scheduling the same target supersedes the previous enqueue; the handle
/// returned last is the live one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UpdateId(u64);

/// Error returned by a commit closure.
///
/// Failures are logged and counted, never propagated: one bad commit must
/// not abort the rest of the batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateError(pub String);

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update failed: {}", self.0)
    }
}

/// Commit closure type. Single-threaded by design, so no `Send` bound.
pub type CommitFn = Box<dyn FnOnce() -> Result<(), UpdateError>>;

/// Built-in category ordering for drag interactions.
///
/// State flags commit before derived positions, positions before visual
/// previews, so each stage observes the stage before it fully applied.
/// [`BatchQueue`] is generic over any `Ord + Copy` category type; this is
/// the ordering the surface uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UpdateCategory {
    /// Drag/selection state flags.
    State,
    /// Derived positions (index bounds, cached pixel offsets).
    Position,
    /// Preview/visual-only updates (ghosts, highlights).
    Preview,
}

/// What a batch run did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Commit closures executed.
    pub executed: usize,
    /// Closures that returned an error (logged, not propagated).
    pub failed: usize,
}

struct Pending<T, C> {
    id: UpdateId,
    target: T,
    category: C,
    priority: Priority,
    seq: u64,
    commit: CommitFn,
}

/// A queue that coalesces high-frequency mutation requests into one commit
/// per frame.
///
/// Between commits the queue holds at most one update per target: a second
/// [`schedule`](Self::schedule) for the same target replaces the closure
/// (last write wins) while keeping the target's original FIFO position. At
/// commit time every queued update runs, ordered by category, then
/// descending priority, then FIFO — so dependent updates observe a
/// consistent intermediate state, and never a partially applied batch.
pub struct BatchQueue<T, C> {
    pending: HashMap<T, Pending<T, C>>,
    pacer: FramePacer,
    deadline: Option<Millis>,
    next_id: u64,
    next_seq: u64,
    failures: u64,
}

impl<T, C> Debug for BatchQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchQueue")
            .field("pending", &self.pending.len())
            .field("deadline", &self.deadline)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl<T, C> BatchQueue<T, C>
where
    T: Copy + Eq + Hash + Debug,
    C: Copy + Ord,
{
    /// Create a queue committing on the given pacer's deadlines.
    pub fn new(pacer: FramePacer) -> Self {
        Self {
            pending: HashMap::new(),
            pacer,
            deadline: None,
            next_id: 0,
            next_seq: 0,
            failures: 0,
        }
    }

    /// Queue a commit closure for `target`.
    ///
    /// `max_delay_ms` bounds how long the update may wait: a sub-frame value
    /// commits at the next frame boundary, a larger one becomes an explicit
    /// timer deadline. The queue's single deadline is the tightest requested
    /// by any pending update.
    ///
    /// A target already queued is coalesced: the new closure, category and
    /// priority replace the old, the FIFO position stays.
    pub fn schedule(
        &mut self,
        target: T,
        category: C,
        priority: Priority,
        max_delay_ms: Millis,
        now: Millis,
        commit: impl FnOnce() -> Result<(), UpdateError> + 'static,
    ) -> UpdateId {
        let id = UpdateId(self.next_id);
        self.next_id += 1;

        match self.pending.get_mut(&target) {
            Some(p) => {
                // Last write wins; seq keeps the original FIFO slot.
                p.id = id;
                p.category = category;
                p.priority = priority;
                p.commit = Box::new(commit);
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.pending.insert(
                    target,
                    Pending {
                        id,
                        target,
                        category,
                        priority,
                        seq,
                        commit: Box::new(commit),
                    },
                );
            }
        }

        let candidate = self.pacer.deadline(now, max_delay_ms);
        self.deadline = Some(match self.deadline {
            Some(d) => d.min(candidate),
            None => candidate,
        });
        id
    }

    /// Cancel a not-yet-committed update. Returns true if it was pending.
    ///
    /// A stale handle (superseded by a later `schedule` for the same target)
    /// cancels nothing.
    pub fn cancel(&mut self, id: UpdateId) -> bool {
        let target = self
            .pending
            .values()
            .find(|p| p.id == id)
            .map(|p| p.target);
        match target {
            Some(t) => {
                self.pending.remove(&t);
                if self.pending.is_empty() {
                    self.deadline = None;
                }
                true
            }
            None => false,
        }
    }

    /// Pending update count.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The current commit deadline, if any update is pending.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.deadline
    }

    /// True once the commit deadline has passed.
    pub fn is_due(&self, now: Millis) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Total closures that have failed since construction.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Commit the batch if the deadline has passed. Returns `None` when not
    /// yet due.
    pub fn run_due(&mut self, now: Millis) -> Option<BatchOutcome> {
        self.is_due(now).then(|| self.process())
    }

    /// Commit the batch immediately, bypassing the scheduled delay.
    ///
    /// For caller-identified critical paths: drag end must resolve before
    /// the next user action, not a frame later.
    pub fn force_run(&mut self) -> BatchOutcome {
        self.process()
    }

    fn process(&mut self) -> BatchOutcome {
        self.deadline = None;
        let mut batch: alloc::vec::Vec<Pending<T, C>> =
            self.pending.drain().map(|(_, p)| p).collect();
        batch.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(b.priority.cmp(&a.priority))
                .then(a.seq.cmp(&b.seq))
        });

        let mut outcome = BatchOutcome::default();
        for p in batch {
            outcome.executed += 1;
            if let Err(err) = (p.commit)() {
                outcome.failed += 1;
                self.failures += 1;
                log::warn!("commit for {:?} failed: {err}", p.target);
            }
        }
        outcome
    }
}
