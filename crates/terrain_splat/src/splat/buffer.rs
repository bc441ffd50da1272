//! Packed RGBA buffers produced by channel packing.
use glam::Vec4;

use crate::raster::CoordRect;

/// One RGBA cell per tile cell, indexed like a [`crate::raster::Grid`] over the same rect.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedBuffer {
    rect: CoordRect,
    cells: Vec<Vec4>,
}

impl PackedBuffer {
    /// Zeroed buffer over `rect`.
    pub fn new(rect: CoordRect) -> Self {
        Self {
            rect,
            cells: vec![Vec4::ZERO; rect.area()],
        }
    }

    pub fn rect(&self) -> CoordRect {
        self.rect
    }

    pub fn cells(&self) -> &[Vec4] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Vec4] {
        &mut self.cells
    }

    pub fn into_cells(self) -> Vec<Vec4> {
        self.cells
    }

    /// Cell at a global coordinate inside the rect.
    #[inline]
    pub fn get(&self, x: i32, z: i32) -> Vec4 {
        self.cells[self.rect.pos(x, z)]
    }

    /// Add `value` to one channel of the cell at flat index `pos`.
    #[inline]
    pub fn add(&mut self, pos: usize, channel: usize, value: f32) {
        self.cells[pos][channel] += value;
    }

    #[inline]
    pub fn set(&mut self, pos: usize, value: Vec4) {
        self.cells[pos] = value;
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A producer-owned cutout mask buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct CutoutBuffer {
    pub producer: String,
    pub buffer: PackedBuffer,
}

/// A packed buffer paired with the material slot it is destined for.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedBuffer {
    pub name: String,
    pub buffer: PackedBuffer,
}

/// Everything one packing pass produces for a tile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackedOutput {
    /// Control buffers in texture-slot order.
    pub splats: Vec<NamedBuffer>,
    /// Cutout buffers in producer order.
    pub cutouts: Vec<CutoutBuffer>,
}

impl PackedOutput {
    pub fn is_empty(&self) -> bool {
        self.splats.is_empty() && self.cutouts.is_empty()
    }

    /// Control buffer destined for `name`.
    pub fn splat(&self, name: &str) -> Option<&PackedBuffer> {
        self.splats
            .iter()
            .find(|b| b.name == name)
            .map(|b| &b.buffer)
    }
}
