//! Generators that read and write grids through named ports.
//!
//! A [`Generator`] declares its input and output ports and transforms grids in a
//! [`ResultStore`]. [`run_generator`] is the single entry point used by the tile pipeline: it
//! polls the stop signal, handles the [`GeneratorState::Disabled`] passthrough, and otherwise
//! calls [`Generator::generate`].
use tracing::{debug, warn};

pub mod edge;
pub mod events;
pub mod height;
pub mod results;
pub mod splat;
pub mod stop;

pub use edge::EdgeDetector;
pub use events::{EventSink, PipelineEvent, PipelineEventKind, SkipReason};
pub use height::HeightFilter;
pub use results::ResultStore;
pub use splat::SplatOutput;
pub use stop::{StopFlag, StopSignal};

use crate::raster::{CoordRect, Grid};

pub type PortId = String;

/// Dimensions of one terrain tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSize {
    /// Cells per tile side.
    pub resolution: i32,
    /// Tile side length in world units.
    pub size: f32,
    /// Terrain height range in world units.
    pub height: f32,
}

impl TileSize {
    pub fn new(resolution: i32, size: f32, height: f32) -> Self {
        Self {
            resolution,
            size,
            height,
        }
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self {
            resolution: 512,
            size: 1000.0,
            height: 200.0,
        }
    }
}

/// Everything a generator knows about the tile it runs for.
#[derive(Clone, Copy, Debug)]
pub struct GenerateContext {
    /// Rect of the tile in global cell coordinates.
    pub rect: CoordRect,
    pub tile_size: TileSize,
    pub seed: u64,
}

impl GenerateContext {
    pub fn new(rect: CoordRect, tile_size: TileSize, seed: u64) -> Self {
        Self {
            rect,
            tile_size,
            seed,
        }
    }
}

/// Whether a generator transforms its inputs or forwards them untouched.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeneratorState {
    #[default]
    Enabled,
    /// Single-input, single-output generators forward the input grid; others commit nothing.
    Disabled,
}

/// A node in the external generator graph.
pub trait Generator: Send + Sync {
    fn id(&self) -> &str;

    fn state(&self) -> GeneratorState;

    fn inputs(&self) -> Vec<&str>;

    fn outputs(&self) -> Vec<&str>;

    /// Ports a disabled generator forwards between: its single input and single output, when
    /// it has exactly one of each.
    fn passthrough_ports(&self) -> Option<(&str, &str)> {
        match (self.inputs().as_slice(), self.outputs().as_slice()) {
            ([input], [output]) => Some((*input, *output)),
            _ => None,
        }
    }

    /// Transform inputs into outputs. Only called for enabled generators.
    fn generate(
        &self,
        ctx: &GenerateContext,
        results: &mut ResultStore,
        stop: &dyn StopSignal,
        sink: &mut dyn EventSink,
    );
}

/// Run one generator for one tile.
pub fn run_generator(
    generator: &dyn Generator,
    ctx: &GenerateContext,
    results: &mut ResultStore,
    stop: &dyn StopSignal,
    sink: &mut dyn EventSink,
) {
    if stop.should_stop(0.0) {
        report_cancelled(generator.id(), sink);
        return;
    }

    match generator.state() {
        GeneratorState::Enabled => {
            if sink.wants(PipelineEventKind::GenerateStarted) {
                sink.send(PipelineEvent::GenerateStarted {
                    generator: generator.id().to_string(),
                });
            }
            generator.generate(ctx, results, stop, sink);
        }
        GeneratorState::Disabled => passthrough(generator, results, sink),
    }
}

fn passthrough(generator: &dyn Generator, results: &mut ResultStore, sink: &mut dyn EventSink) {
    let Some((input, output)) = generator.passthrough_ports() else {
        debug!(
            "Disabled generator '{}' does not forward; nothing committed.",
            generator.id()
        );
        return;
    };

    let Some(grid) = results.get_copy(input) else {
        debug!(
            "Disabled generator '{}' has no input on '{}'; nothing committed.",
            generator.id(),
            input
        );
        return;
    };

    let (input, output) = (input.to_string(), output.to_string());
    results.commit(output.clone(), grid);
    if sink.wants(PipelineEventKind::Passthrough) {
        sink.send(PipelineEvent::Passthrough {
            generator: generator.id().to_string(),
            input,
            output,
        });
    }
}

/// Copy of the grid on `port`, or a grid over `rect` filled with `neutral` when absent.
pub(crate) fn load_input_or_neutral(
    generator: &str,
    results: &ResultStore,
    port: Option<&str>,
    rect: CoordRect,
    neutral: f32,
    sink: &mut dyn EventSink,
) -> Grid {
    match port {
        Some(port) => match results.get_copy(port) {
            Some(grid) => grid,
            None => {
                warn!(
                    "Generator '{}' has no input on '{}'; using a neutral grid.",
                    generator, port
                );
                if sink.wants(PipelineEventKind::Warning) {
                    sink.send(PipelineEvent::Warning {
                        context: generator.to_string(),
                        message: format!("no input on '{port}'"),
                    });
                }
                Grid::filled(rect, neutral)
            }
        },
        None => Grid::filled(rect, neutral),
    }
}

pub(crate) fn commit_output(
    generator: &str,
    results: &mut ResultStore,
    port: &str,
    grid: Grid,
    sink: &mut dyn EventSink,
) {
    results.commit(port, grid);
    if sink.wants(PipelineEventKind::OutputCommitted) {
        sink.send(PipelineEvent::OutputCommitted {
            generator: generator.to_string(),
            port: port.to_string(),
        });
    }
}

pub(crate) fn report_cancelled(context: &str, sink: &mut dyn EventSink) {
    debug!("Stop requested during '{}'.", context);
    if sink.wants(PipelineEventKind::Cancelled) {
        sink.send(PipelineEvent::Cancelled {
            context: context.to_string(),
        });
    }
}
