//! Per-tile result store keyed by port.
//!
//! Generators read their inputs and commit their outputs here. Reads hand out shared
//! references; anything a generator intends to modify is copied first with
//! [`ResultStore::get_copy`], so downstream edits never reach an upstream result.
use std::collections::HashMap;

use super::PortId;
use crate::raster::Grid;

/// Committed grids of one tile pass.
#[derive(Clone, Debug, Default)]
pub struct ResultStore {
    grids: HashMap<PortId, Grid>,
    heights: Option<Grid>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the normalized terrain height of the tile (0 bottom, 1 top).
    pub fn with_heights(mut self, heights: Grid) -> Self {
        self.heights = Some(heights);
        self
    }

    pub fn set_heights(&mut self, heights: Grid) {
        self.heights = Some(heights);
    }

    pub fn heights(&self) -> Option<&Grid> {
        self.heights.as_ref()
    }

    /// Store `grid` under `port`, replacing any previous result.
    pub fn commit(&mut self, port: impl Into<PortId>, grid: Grid) {
        self.grids.insert(port.into(), grid);
    }

    pub fn get(&self, port: &str) -> Option<&Grid> {
        self.grids.get(port)
    }

    /// Owned copy of the grid on `port`.
    pub fn get_copy(&self, port: &str) -> Option<Grid> {
        self.grids.get(port).cloned()
    }

    pub fn contains(&self, port: &str) -> bool {
        self.grids.contains_key(port)
    }

    pub fn remove(&mut self, port: &str) -> Option<Grid> {
        self.grids.remove(port)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn clear(&mut self) {
        self.grids.clear();
        self.heights = None;
    }
}
