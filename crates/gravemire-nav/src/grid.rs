//! Tile grid occupancy model with world/cell coordinate conversion.

use gravemire_common::{CellCoord, Vec2};
use serde::{Deserialize, Serialize};

/// A bounded uniform grid of walkable/blocked cells.
///
/// The grid is the source of truth for occupancy during a pathfinding run;
/// it does not change mid-search. Cells outside the bounds are treated as
/// blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    /// World position of the minimum corner of cell (0, 0).
    origin: Vec2,
    cell_size: f32,
    /// Row-major blocked flags, `height * width` entries.
    blocked: Vec<bool>,
}

impl TileGrid {
    /// Creates an all-open grid of the given dimensions with unit cells at
    /// the world origin.
    #[must_use]
    pub fn new(width: u32, height: u32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            origin: Vec2::ZERO,
            cell_size: cell_size.max(f32::EPSILON),
            blocked: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Sets the world position of the grid's minimum corner.
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Builds a grid from ASCII rows where `#` marks a blocked cell.
    ///
    /// Rows are listed top-down; row 0 in the slice becomes the highest `y`.
    /// All rows must have equal length.
    #[must_use]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len()) as u32;
        let mut grid = Self::new(width, height, 1.0);
        for (row_idx, row) in rows.iter().enumerate() {
            let y = height as i32 - 1 - row_idx as i32;
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set_blocked(CellCoord::new(x as i32, y), true);
                }
            }
        }
        grid
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Size of one cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Checks whether a cell lies inside the grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// Marks a cell blocked or open. Out-of-bounds cells are ignored.
    pub fn set_blocked(&mut self, cell: CellCoord, blocked: bool) {
        if self.in_bounds(cell) {
            let idx = (cell.y as usize) * (self.width as usize) + (cell.x as usize);
            self.blocked[idx] = blocked;
        }
    }

    /// Checks whether a cell is blocked. Out-of-bounds cells are blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        if !self.in_bounds(cell) {
            return true;
        }
        let idx = (cell.y as usize) * (self.width as usize) + (cell.x as usize);
        self.blocked[idx]
    }

    /// Converts a world position to the cell containing it.
    #[must_use]
    pub fn world_to_cell(&self, pos: Vec2) -> CellCoord {
        let local = (pos - self.origin) / self.cell_size;
        CellCoord::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    /// Returns the world position of a cell's center.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.origin
            + Vec2::new(
                (cell.x as f32 + 0.5) * self.cell_size,
                (cell.y as f32 + 0.5) * self.cell_size,
            )
    }

    /// Checks whether the cell containing a world position is open.
    #[must_use]
    pub fn is_walkable(&self, pos: Vec2) -> bool {
        !self.is_blocked(self.world_to_cell(pos))
    }
}
