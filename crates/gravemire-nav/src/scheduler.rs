//! Throttled FIFO scheduler funneling path requests through one solver.
//!
//! Many agents re-request paths every few ticks; running a full A* per agent
//! per tick is the dominant CPU cost. The scheduler trades path freshness
//! for a bounded cost: requests queue in arrival order and at most one is
//! solved per tick, with a minimum interval between consecutive solves.

use crate::astar::{Path, PathSolver};
use crate::grid::TileGrid;
use gravemire_common::Vec2;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Callback invoked with the solve outcome (`None` means unreachable).
pub type PathCallback = Box<dyn FnOnce(Option<Path>) + Send>;

struct PendingRequest {
    start: Vec2,
    target: Vec2,
    on_complete: PathCallback,
}

/// Serializes pathfinding requests through a single pooled solver.
pub struct PathScheduler {
    queue: VecDeque<PendingRequest>,
    solver: PathSolver,
    /// Minimum delay between consecutive solves, in seconds.
    interval: f32,
    cooldown: f32,
}

impl fmt::Debug for PathScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathScheduler")
            .field("queued", &self.queue.len())
            .field("interval", &self.interval)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

impl PathScheduler {
    /// Default minimum interval between solves, in seconds.
    pub const DEFAULT_INTERVAL: f32 = 0.05;

    /// Creates a scheduler with the given minimum inter-request interval.
    #[must_use]
    pub fn new(interval: f32) -> Self {
        Self {
            queue: VecDeque::new(),
            solver: PathSolver::new(),
            interval: interval.max(0.0),
            cooldown: 0.0,
        }
    }

    /// Number of requests waiting to be solved.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Enqueues a path request. The callback fires exactly once, from a
    /// later [`tick`](Self::tick), in FIFO order with all other requests.
    pub fn request(
        &mut self,
        start: Vec2,
        target: Vec2,
        on_complete: impl FnOnce(Option<Path>) + Send + 'static,
    ) {
        trace!(?start, ?target, queued = self.queue.len(), "path requested");
        self.queue.push_back(PendingRequest {
            start,
            target,
            on_complete: Box::new(on_complete),
        });
    }

    /// Advances the throttle clock and solves at most one queued request.
    pub fn tick(&mut self, grid: &TileGrid, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
        if self.cooldown > 0.0 {
            return;
        }
        if let Some(req) = self.queue.pop_front() {
            let outcome = self.solver.find_path(grid, req.start, req.target);
            trace!(found = outcome.is_some(), "path request served");
            (req.on_complete)(outcome);
            self.cooldown = self.interval;
        }
    }
}

/// Shared mailbox a path callback writes into and its requester polls.
///
/// Agents keep following their current path while a fresher request is in
/// flight; when the result lands, [`take`](Self::take) hands it over once.
/// A later delivery overwrites an unclaimed earlier one (last-request-wins).
#[derive(Debug, Clone, Default)]
pub struct PathSlot {
    inner: Arc<Mutex<Option<Option<Path>>>>,
}

impl PathSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a solve outcome, replacing any unclaimed one.
    pub fn deliver(&self, outcome: Option<Path>) {
        *self.inner.lock() = Some(outcome);
    }

    /// Takes the delivered outcome, if any. The outer `None` means nothing
    /// has been delivered since the last take; the inner `None` means the
    /// solver reported unreachable.
    pub fn take(&self) -> Option<Option<Path>> {
        self.inner.lock().take()
    }
}
