//! Grid line-of-sight via DDA ray marching.
//!
//! Sight checks drive the chase and retreat decisions, so they run far more
//! often than path solves. The DDA (Digital Differential Analyzer) march
//! visits exactly the cells a segment crosses, without sampling artifacts.

use crate::grid::TileGrid;
use gravemire_common::Vec2;

/// Checks whether the segment from `from` to `to` crosses only open cells.
///
/// The target's own cell is never treated as an occluder: reaching it means
/// the target is visible even if it stands inside a blocked cell. Any other
/// blocked cell along the segment breaks the line.
#[must_use]
pub fn line_of_sight(grid: &TileGrid, from: Vec2, to: Vec2) -> bool {
    let from_cell = grid.world_to_cell(from);
    let to_cell = grid.world_to_cell(to);
    if from_cell == to_cell {
        return true;
    }

    let delta = to - from;
    let max_dist = delta.length();
    if max_dist < f32::EPSILON {
        return true;
    }
    let dir = delta / max_dist;

    let cell_size = grid.cell_size();
    let mut cell_x = from_cell.x;
    let mut cell_y = from_cell.y;

    // Distance along the ray per one-cell step on each axis
    let step_x = if dir.x.abs() > f32::EPSILON {
        (cell_size / dir.x).abs()
    } else {
        f32::MAX
    };
    let step_y = if dir.y.abs() > f32::EPSILON {
        (cell_size / dir.y).abs()
    } else {
        f32::MAX
    };

    let sign_x: i32 = if dir.x > 0.0 { 1 } else { -1 };
    let sign_y: i32 = if dir.y > 0.0 { 1 } else { -1 };

    // Distance along the ray to the first boundary crossing on each axis
    let cell_min = grid.cell_center(from_cell) - Vec2::splat(cell_size * 0.5);
    let mut t_max_x = if dir.x > 0.0 {
        (cell_min.x + cell_size - from.x) / dir.x
    } else if dir.x < 0.0 {
        (cell_min.x - from.x) / dir.x
    } else {
        f32::MAX
    };
    let mut t_max_y = if dir.y > 0.0 {
        (cell_min.y + cell_size - from.y) / dir.y
    } else if dir.y < 0.0 {
        (cell_min.y - from.y) / dir.y
    } else {
        f32::MAX
    };

    let mut dist = 0.0;
    while dist <= max_dist {
        if t_max_x < t_max_y {
            dist = t_max_x;
            t_max_x += step_x;
            cell_x += sign_x;
        } else {
            dist = t_max_y;
            t_max_y += step_y;
            cell_y += sign_y;
        }
        if dist > max_dist {
            break;
        }

        let cell = gravemire_common::CellCoord::new(cell_x, cell_y);
        if cell == to_cell {
            return true;
        }
        if grid.is_blocked(cell) {
            return false;
        }
    }

    // Ray exhausted without entering the target cell
    false
}
