//! Turning packed buffers into welded textures, one step at a time.
//!
//! [`Materializer::step`] does a bounded amount of work and returns, so a host can interleave
//! materialization with other tiles or frames:
//! 1. one step per control buffer, creating its texture;
//! 2. one step welding every control texture against ready neighbors;
//! 3. one step creating and welding the cutout textures.
//!
//! [`Materializer::run`] drives all steps at once.
use std::collections::VecDeque;

use tracing::info;

use super::store::NeighborAccess;
use super::texture::{NamedTexture, TileTexture};
use super::weld::weld_to_neighbors;
use crate::config::SplatConfig;
use crate::generator::{report_cancelled, EventSink, PipelineEvent, PipelineEventKind, StopSignal};
use crate::raster::TileCoord;
use crate::splat::{CutoutBuffer, NamedBuffer, PackedOutput};

/// Outcome of one [`Materializer::step`].
#[derive(Debug, PartialEq)]
pub enum MaterializeStep {
    /// More steps remain.
    Pending,
    /// All textures are created and welded.
    Done(Vec<NamedTexture>),
    /// The stop signal fired. Nothing further is produced.
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Create,
    Weld,
    Cutouts,
    Finished,
}

pub struct Materializer<'a> {
    tile: TileCoord,
    config: &'a SplatConfig,
    neighbors: &'a dyn NeighborAccess,
    pending: VecDeque<NamedBuffer>,
    cutouts: Vec<CutoutBuffer>,
    textures: Vec<NamedTexture>,
    phase: Phase,
}

impl<'a> Materializer<'a> {
    pub fn new(
        tile: TileCoord,
        packed: PackedOutput,
        config: &'a SplatConfig,
        neighbors: &'a dyn NeighborAccess,
    ) -> Self {
        Self {
            tile,
            config,
            neighbors,
            textures: Vec::with_capacity(packed.splats.len() + packed.cutouts.len()),
            pending: packed.splats.into(),
            cutouts: packed.cutouts,
            phase: Phase::Create,
        }
    }

    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    fn progress(&self) -> f32 {
        match self.phase {
            Phase::Create => 0.0,
            Phase::Weld => 0.5,
            Phase::Cutouts => 0.75,
            Phase::Finished => 1.0,
        }
    }

    fn created(&self, name: &str, sink: &mut dyn EventSink) {
        if sink.wants(PipelineEventKind::TextureCreated) {
            sink.send(PipelineEvent::TextureCreated {
                tile: self.tile,
                name: name.to_string(),
            });
        }
    }

    /// Advance by one step.
    pub fn step(&mut self, stop: &dyn StopSignal, sink: &mut dyn EventSink) -> MaterializeStep {
        if self.phase == Phase::Finished {
            return MaterializeStep::Done(Vec::new());
        }
        if stop.should_stop(self.progress()) {
            report_cancelled("materialize", sink);
            self.phase = Phase::Finished;
            self.textures.clear();
            return MaterializeStep::Cancelled;
        }

        match self.phase {
            Phase::Create => {
                match self.pending.pop_front() {
                    Some(NamedBuffer { name, buffer }) => {
                        self.created(&name, sink);
                        self.textures.push(NamedTexture {
                            name,
                            texture: TileTexture::from_buffer(buffer),
                        });
                    }
                    None => self.phase = Phase::Weld,
                }
                MaterializeStep::Pending
            }
            Phase::Weld => {
                if self.config.welding_enabled() {
                    for t in &mut self.textures {
                        weld_to_neighbors(
                            self.tile,
                            &t.name,
                            &mut t.texture,
                            self.neighbors,
                            self.config.weld_margin,
                            sink,
                        );
                    }
                }
                self.phase = Phase::Cutouts;
                MaterializeStep::Pending
            }
            Phase::Cutouts => {
                let name = self.config.cutout_texture_name.clone();
                for cutout in std::mem::take(&mut self.cutouts) {
                    let mut texture = TileTexture::from_buffer(cutout.buffer);
                    self.created(&name, sink);
                    if self.config.welding_enabled() {
                        weld_to_neighbors(
                            self.tile,
                            &name,
                            &mut texture,
                            self.neighbors,
                            self.config.weld_margin,
                            sink,
                        );
                    }
                    self.textures.push(NamedTexture {
                        name: name.clone(),
                        texture,
                    });
                }
                self.phase = Phase::Finished;
                info!(
                    "Materialized {} textures for tile {:?}.",
                    self.textures.len(),
                    self.tile
                );
                MaterializeStep::Done(std::mem::take(&mut self.textures))
            }
            Phase::Finished => MaterializeStep::Done(Vec::new()),
        }
    }

    /// Run every remaining step. Returns `None` when stopped.
    pub fn run(
        mut self,
        stop: &dyn StopSignal,
        sink: &mut dyn EventSink,
    ) -> Option<Vec<NamedTexture>> {
        loop {
            match self.step(stop, sink) {
                MaterializeStep::Pending => continue,
                MaterializeStep::Done(textures) => return Some(textures),
                MaterializeStep::Cancelled => return None,
            }
        }
    }
}

/// Materialize `packed` for `tile` in one go.
pub fn materialize(
    tile: TileCoord,
    packed: PackedOutput,
    config: &SplatConfig,
    neighbors: &dyn NeighborAccess,
    stop: &dyn StopSignal,
    sink: &mut dyn EventSink,
) -> Option<Vec<NamedTexture>> {
    Materializer::new(tile, packed, config, neighbors).run(stop, sink)
}
