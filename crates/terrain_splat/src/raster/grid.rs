//! Float grids addressed in global cell coordinates.
//!
//! A [`Grid`] is the map type every generator reads and writes. It owns a flat row-major
//! buffer whose length always equals the area of its [`CoordRect`].
use super::rect::CoordRect;
use crate::error::{Error, Result};

/// A rectangular float buffer with its rect in global cell space.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rect: CoordRect,
    data: Vec<f32>,
}

impl Grid {
    /// Create a grid covering `rect`, initializing all values to zero.
    pub fn new(rect: CoordRect) -> Self {
        Self::filled(rect, 0.0)
    }

    /// Create a grid covering `rect` with every cell set to `value`.
    pub fn filled(rect: CoordRect, value: f32) -> Self {
        Self {
            rect,
            data: vec![value; rect.area()],
        }
    }

    /// Wrap an existing buffer. Fails when its length differs from the rect area.
    pub fn from_vec(rect: CoordRect, data: Vec<f32>) -> Result<Self> {
        if data.len() != rect.area() {
            return Err(Error::GridSize {
                expected: rect.area(),
                actual: data.len(),
            });
        }
        Ok(Self { rect, data })
    }

    /// Build a grid by evaluating `f` at every global coordinate.
    pub fn from_fn(rect: CoordRect, mut f: impl FnMut(i32, i32) -> f32) -> Self {
        let data = rect.cells().map(|c| f(c.x, c.z)).collect();
        Self { rect, data }
    }

    #[inline]
    pub fn rect(&self) -> CoordRect {
        self.rect
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        self.rect.contains(x, z)
    }

    /// Value at a global coordinate. The coordinate must lie inside the rect.
    #[inline]
    pub fn get(&self, x: i32, z: i32) -> f32 {
        self.data[self.rect.pos(x, z)]
    }

    /// Value at a global coordinate, or `None` outside the rect.
    #[inline]
    pub fn try_get(&self, x: i32, z: i32) -> Option<f32> {
        self.rect.try_pos(x, z).map(|i| self.data[i])
    }

    /// Mutable reference to a cell. The coordinate must lie inside the rect.
    #[inline]
    pub fn get_mut(&mut self, x: i32, z: i32) -> &mut f32 {
        let i = self.rect.pos(x, z);
        &mut self.data[i]
    }

    #[inline]
    pub fn set(&mut self, x: i32, z: i32, value: f32) {
        *self.get_mut(x, z) = value;
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Copy of this grid over `rect`. Cells outside this grid read 0.
    pub fn resampled(&self, rect: CoordRect) -> Grid {
        if rect == self.rect {
            return self.clone();
        }
        Grid::from_fn(rect, |x, z| self.try_get(x, z).unwrap_or(0.0))
    }

    /// `true` when no cell holds a nonzero value.
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|v| *v == 0.0)
    }
}
