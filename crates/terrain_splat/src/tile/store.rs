//! Materialized textures of all tiles and their readiness.
//!
//! The scheduler marks a tile ready once its textures are in place. Neighbor textures are
//! only visible to welding while ready. When a tile becomes ready, the store re-welds it and
//! every ready tile around it, so both sides of an edge hold the same values no matter which
//! tile finished first.
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::texture::{NamedTexture, TileTexture};
use super::weld::{weld_texture, WeldNeighbors};
use crate::error::{Error, Result};
use crate::generator::{EventSink, PipelineEvent, PipelineEventKind};
use crate::raster::{Direction, TileCoord};

/// Read access to finished neighbor textures.
pub trait NeighborAccess {
    /// Texture `name` of `tile`, if the tile exists and is ready.
    fn ready_texture(&self, tile: TileCoord, name: &str) -> Option<Arc<TileTexture>>;
}

/// No neighbors.
impl NeighborAccess for () {
    fn ready_texture(&self, _tile: TileCoord, _name: &str) -> Option<Arc<TileTexture>> {
        None
    }
}

#[derive(Debug, Default)]
struct TileEntry {
    ready: bool,
    textures: HashMap<String, Arc<TileTexture>>,
}

#[derive(Debug, Default)]
pub struct TileTextureStore {
    tiles: HashMap<TileCoord, TileEntry>,
}

impl TileTextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the textures of `tile`. The tile is not ready until [`Self::mark_ready`].
    ///
    /// Textures sharing a name replace each other in order.
    pub fn insert(&mut self, tile: TileCoord, textures: Vec<NamedTexture>) {
        let entry = self.tiles.entry(tile).or_default();
        entry.ready = false;
        entry.textures = textures
            .into_iter()
            .map(|t| (t.name, Arc::new(t.texture)))
            .collect();
    }

    pub fn remove(&mut self, tile: TileCoord) -> bool {
        self.tiles.remove(&tile).is_some()
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        self.tiles.contains_key(&tile)
    }

    pub fn is_ready(&self, tile: TileCoord) -> bool {
        self.tiles.get(&tile).is_some_and(|e| e.ready)
    }

    /// Texture `name` of `tile`, ready or not.
    pub fn texture(&self, tile: TileCoord, name: &str) -> Option<&TileTexture> {
        self.tiles
            .get(&tile)
            .and_then(|e| e.textures.get(name))
            .map(Arc::as_ref)
    }

    pub fn texture_names(&self, tile: TileCoord) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .tiles
            .get(&tile)
            .map(|e| e.textures.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Hide `tile` from neighbor welding, e.g. while it regenerates.
    pub fn mark_unready(&mut self, tile: TileCoord) {
        if let Some(entry) = self.tiles.get_mut(&tile) {
            entry.ready = false;
        }
    }

    /// Mark `tile` ready and re-weld it together with every ready tile around it.
    ///
    /// Tiles across an edge or a corner are re-welded, since their corner pixels depend on
    /// which tiles at that corner are ready. Returns the number of edges `tile` now shares
    /// with ready neighbors (each shared edge of a texture counts once).
    pub fn mark_ready(
        &mut self,
        tile: TileCoord,
        margin: usize,
        sink: &mut dyn EventSink,
    ) -> Result<usize> {
        let entry = self
            .tiles
            .get_mut(&tile)
            .ok_or(Error::UnknownTile { tile })?;
        entry.ready = true;
        if margin == 0 {
            return Ok(0);
        }

        let mut welded = 0;
        for (name, directions) in self.reweld(tile, margin) {
            for direction in directions {
                welded += 1;
                let neighbor = tile.neighbor(direction);
                for (t, d) in [(tile, direction), (neighbor, direction.opposite())] {
                    if sink.wants(PipelineEventKind::WeldApplied) {
                        sink.send(PipelineEvent::WeldApplied {
                            tile: t,
                            direction: d,
                            name: name.clone(),
                        });
                    }
                }
            }
        }

        for dz in -1..=1 {
            for dx in -1..=1 {
                let around = TileCoord(tile.0 + dx, tile.1 + dz);
                if around != tile && self.is_ready(around) {
                    self.reweld(around, margin);
                }
            }
        }
        debug!("Tile {:?} ready; {} edges welded.", tile, welded);
        Ok(welded)
    }

    /// Re-weld every texture of `tile` against the ready tiles around it.
    fn reweld(&mut self, tile: TileCoord, margin: usize) -> Vec<(String, Vec<Direction>)> {
        let mut names: Vec<String> = self
            .tiles
            .get(&tile)
            .map(|e| e.textures.keys().cloned().collect())
            .unwrap_or_default();
        names.sort_unstable();

        let mut welded = Vec::with_capacity(names.len());
        for name in names {
            let Some(own) = self.tiles.get(&tile).and_then(|e| e.textures.get(&name)) else {
                continue;
            };
            let mut texture = TileTexture::clone(own);
            let around = WeldNeighbors::gather(tile, &name, &*self);
            let directions = weld_texture(&mut texture, &around, margin);
            if let Some(entry) = self.tiles.get_mut(&tile) {
                entry.textures.insert(name.clone(), Arc::new(texture));
            }
            welded.push((name, directions));
        }
        welded
    }
}

impl NeighborAccess for TileTextureStore {
    fn ready_texture(&self, tile: TileCoord, name: &str) -> Option<Arc<TileTexture>> {
        let entry = self.tiles.get(&tile)?;
        if !entry.ready {
            return None;
        }
        entry.textures.get(name).cloned()
    }
}
