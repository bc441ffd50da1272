//! Global cell coordinates, rectangles, and tile addressing.
//!
//! [`CoordRect`] describes the region a [`crate::raster::Grid`] covers in the shared global
//! cell space. [`TileCoord`] identifies a tile in the 2D tile layout and [`Direction`] names
//! its four cardinal neighbors.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cell coordinate in global space.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub z: i32,
}

impl Coord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Axis-aligned rectangle of cells: `[offset, offset + size)` on both axes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CoordRect {
    /// Global coordinate of the first cell.
    pub offset: Coord,
    /// Number of cells along each axis.
    pub size: Coord,
}

impl CoordRect {
    pub const fn new(offset_x: i32, offset_z: i32, size_x: i32, size_z: i32) -> Self {
        Self {
            offset: Coord::new(offset_x, offset_z),
            size: Coord::new(size_x, size_z),
        }
    }

    /// Inclusive lower corner.
    #[inline]
    pub fn min(&self) -> Coord {
        self.offset
    }

    /// Exclusive upper corner.
    #[inline]
    pub fn max(&self) -> Coord {
        Coord::new(self.offset.x + self.size.x, self.offset.z + self.size.z)
    }

    /// Number of cells covered, zero for degenerate rects.
    #[inline]
    pub fn area(&self) -> usize {
        (self.size.x.max(0) as usize) * (self.size.z.max(0) as usize)
    }

    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        let max = self.max();
        x >= self.offset.x && x < max.x && z >= self.offset.z && z < max.z
    }

    /// Flat row-major index of a global coordinate. The coordinate must lie inside the rect.
    #[inline]
    pub fn pos(&self, x: i32, z: i32) -> usize {
        debug_assert!(self.contains(x, z), "({x}, {z}) outside {self:?}");
        ((z - self.offset.z) as usize) * (self.size.x as usize) + (x - self.offset.x) as usize
    }

    /// Flat index of a global coordinate, or `None` when it lies outside.
    #[inline]
    pub fn try_pos(&self, x: i32, z: i32) -> Option<usize> {
        self.contains(x, z).then(|| self.pos(x, z))
    }

    /// Iterates all global coordinates in row-major order (x fastest).
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        let min = self.min();
        let max = self.max();
        (min.z..max.z).flat_map(move |z| (min.x..max.x).map(move |x| Coord::new(x, z)))
    }
}

/// Identifier for a tile in the tile layout.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord(
    /// Tile index along the X axis.
    pub i32,
    /// Tile index along the Z axis.
    pub i32,
);

impl TileCoord {
    /// Tile containing the cell `offset` when every tile spans `resolution` cells.
    pub fn for_offset(offset: Coord, resolution: i32) -> Self {
        debug_assert!(resolution > 0, "resolution must be > 0");
        TileCoord(
            offset.x.div_euclid(resolution),
            offset.z.div_euclid(resolution),
        )
    }

    /// The adjacent tile in `direction`.
    pub fn neighbor(self, direction: Direction) -> Self {
        let (dx, dz) = direction.delta();
        TileCoord(self.0 + dx, self.1 + dz)
    }
}

/// Cardinal direction from a tile to one of its neighbors.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    PrevX,
    NextX,
    PrevZ,
    NextZ,
}

impl Direction {
    /// Weld order used by tiles.
    pub const ALL: [Direction; 4] = [
        Direction::PrevX,
        Direction::NextX,
        Direction::PrevZ,
        Direction::NextZ,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::PrevX => (-1, 0),
            Direction::NextX => (1, 0),
            Direction::PrevZ => (0, -1),
            Direction::NextZ => (0, 1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::PrevX => Direction::NextX,
            Direction::NextX => Direction::PrevX,
            Direction::PrevZ => Direction::NextZ,
            Direction::NextZ => Direction::PrevZ,
        }
    }
}
