//! A* path solver over the tile grid.

use crate::grid::TileGrid;
use crate::heap::IndexedMinHeap;
use ahash::{AHashMap, AHashSet};
use gravemire_common::{CellCoord, Vec2};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// An ordered sequence of waypoint world positions.
///
/// The first waypoint is the center of the start cell and the last is the
/// center of the target cell. A path is owned by the agent that requested
/// it and replaced wholesale on each new solve, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Wraps a waypoint list.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Checks whether the path has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Returns the waypoint at `index`, if any.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// All waypoints in order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }
}

/// A* solver with pooled working structures.
///
/// The heap and score maps are cleared at the start of every solve rather
/// than reallocated. Solves are serialized by the request scheduler, so a
/// single working set exists at a time.
#[derive(Debug, Default)]
pub struct PathSolver {
    open: IndexedMinHeap,
    came_from: AHashMap<CellCoord, CellCoord>,
    g_score: AHashMap<CellCoord, f32>,
    closed: AHashSet<CellCoord>,
}

impl PathSolver {
    /// Creates a solver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a route from `start` to `target`, or `None` if unreachable.
    ///
    /// Start or target falling on a blocked cell is an immediate `None`
    /// without searching; that is the expected fast-fail, not an error.
    pub fn find_path(&mut self, grid: &TileGrid, start: Vec2, target: Vec2) -> Option<Path> {
        let start_cell = grid.world_to_cell(start);
        let target_cell = grid.world_to_cell(target);

        self.open.clear();
        self.came_from.clear();
        self.g_score.clear();
        self.closed.clear();

        if grid.is_blocked(start_cell) || grid.is_blocked(target_cell) {
            trace!(?start_cell, ?target_cell, "path endpoints blocked");
            return None;
        }

        self.g_score.insert(start_cell, 0.0);
        self.open
            .push(start_cell, heuristic(start_cell, target_cell));

        while let Some(current) = self.open.pop() {
            if current == target_cell {
                return Some(self.reconstruct(grid, current));
            }
            self.closed.insert(current);

            let current_g = self.g_score.get(&current).copied().unwrap_or(f32::INFINITY);
            for neighbor in current.neighbors4() {
                if self.closed.contains(&neighbor) || grid.is_blocked(neighbor) {
                    continue;
                }
                let tentative = current_g + 1.0;
                let known = self.g_score.get(&neighbor).copied().unwrap_or(f32::INFINITY);
                if tentative < known {
                    self.came_from.insert(neighbor, current);
                    self.g_score.insert(neighbor, tentative);
                    let f = tentative + heuristic(neighbor, target_cell);
                    if !self.open.push(neighbor, f) {
                        self.open.update_priority(neighbor, f);
                    }
                }
            }
        }

        trace!(?start_cell, ?target_cell, "open set exhausted, unreachable");
        None
    }

    fn reconstruct(&self, grid: &TileGrid, end: CellCoord) -> Path {
        let mut cells = vec![end];
        let mut current = end;
        while let Some(&prev) = self.came_from.get(&current) {
            current = prev;
            cells.push(current);
        }
        cells.reverse();
        Path::new(cells.into_iter().map(|c| grid.cell_center(c)).collect())
    }
}

/// Manhattan distance heuristic; admissible for 4-connected unit steps.
fn heuristic(a: CellCoord, b: CellCoord) -> f32 {
    a.manhattan_distance(b) as f32
}
