//! Grid cell coordinates.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Integer coordinate of a cell on the uniform tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct CellCoord {
    /// X coordinate in cell space
    pub x: i32,
    /// Y coordinate in cell space
    pub y: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell (`|dx| + |dy|`).
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four edge-adjacent neighbors (no diagonals).
    #[must_use]
    pub const fn neighbors4(self) -> [Self; 4] {
        [
            Self::new(self.x + 1, self.y),
            Self::new(self.x - 1, self.y),
            Self::new(self.x, self.y + 1),
            Self::new(self.x, self.y - 1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = CellCoord::new(0, 0);
        let b = CellCoord::new(3, -4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(b.manhattan_distance(a), 7);
        assert_eq!(a.manhattan_distance(a), 0);
    }

    #[test]
    fn test_neighbors4() {
        let c = CellCoord::new(2, 2);
        let n = c.neighbors4();
        assert_eq!(n.len(), 4);
        for neighbor in n {
            assert_eq!(c.manhattan_distance(neighbor), 1);
        }
    }
}
