//! Event types and sinks for observing tile passes.
//!
//! This module defines [`PipelineEvent`], the [`EventSink`] trait and a collecting
//! [`VecSink`]. Events are emitted while running generators via
//! [`crate::generator::run_generator`], packing channels via
//! [`crate::splat::packer::pack_channels`], or materializing textures via
//! [`crate::tile::materialize::Materializer`].
use crate::raster::{Direction, TileCoord};

/// Describes events emitted during a tile pass.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Emitted when an enabled generator starts its generate step.
    GenerateStarted {
        /// Generator id.
        generator: String,
    },

    /// Emitted when a disabled generator forwards its input unchanged.
    Passthrough {
        /// Generator id.
        generator: String,
        /// Port the input was read from.
        input: String,
        /// Port the copy was committed to.
        output: String,
    },

    /// Emitted after a grid was committed to the result store.
    OutputCommitted {
        /// Generator id.
        generator: String,
        /// Output port.
        port: String,
    },

    /// Emitted when the stop signal ended a phase early.
    Cancelled {
        /// Phase that observed the stop (e.g. `generate:edges`, `pack`).
        context: String,
    },

    /// Emitted when a producer contributes nothing to the packed buffers.
    ProducerSkipped {
        /// Producer id.
        producer: String,
        /// Why it was skipped.
        reason: SkipReason,
    },

    /// Emitted when a single layer of a producer contributes nothing.
    LayerSkipped {
        /// Producer id.
        producer: String,
        /// Layer name.
        layer: String,
        /// Why it was skipped.
        reason: SkipReason,
    },

    /// Emitted once per pack when cluster indices fell outside the configured range.
    ClusterFallback {
        /// Number of cells that were reset to cluster 0.
        cells: usize,
    },

    /// Emitted when a packed buffer was turned into a texture.
    TextureCreated {
        /// Tile the texture belongs to.
        tile: TileCoord,
        /// Material slot name of the texture.
        name: String,
    },

    /// Emitted after a texture edge was welded to a neighbor.
    WeldApplied {
        /// Tile whose texture was modified.
        tile: TileCoord,
        /// Direction of the neighbor.
        direction: Direction,
        /// Material slot name of the texture.
        name: String,
    },

    /// Emitted when a weld direction was skipped.
    WeldSkipped {
        /// Tile whose texture would have been modified.
        tile: TileCoord,
        /// Direction of the neighbor.
        direction: Direction,
        /// Material slot name of the texture.
        name: String,
    },

    /// Non-fatal warning.
    Warning {
        /// Context string (e.g. generator id, producer id).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Reason a producer or layer was left out of packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The producer is disabled.
    Disabled,
    /// The biome mask is declared but missing from the result store.
    MissingBiomeMask,
    /// The biome mask has no nonzero cell.
    EmptyBiomeMask,
    /// The layer output was never committed.
    MissingOutput,
    /// The layer output has no nonzero cell.
    EmptyOutput,
}

/// Discriminant of [`PipelineEvent`], used to filter what a sink receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineEventKind {
    GenerateStarted,
    Passthrough,
    OutputCommitted,
    Cancelled,
    ProducerSkipped,
    LayerSkipped,
    ClusterFallback,
    TextureCreated,
    WeldApplied,
    WeldSkipped,
    Warning,
}

impl PipelineEvent {
    pub fn kind(&self) -> PipelineEventKind {
        match self {
            PipelineEvent::GenerateStarted { .. } => PipelineEventKind::GenerateStarted,
            PipelineEvent::Passthrough { .. } => PipelineEventKind::Passthrough,
            PipelineEvent::OutputCommitted { .. } => PipelineEventKind::OutputCommitted,
            PipelineEvent::Cancelled { .. } => PipelineEventKind::Cancelled,
            PipelineEvent::ProducerSkipped { .. } => PipelineEventKind::ProducerSkipped,
            PipelineEvent::LayerSkipped { .. } => PipelineEventKind::LayerSkipped,
            PipelineEvent::ClusterFallback { .. } => PipelineEventKind::ClusterFallback,
            PipelineEvent::TextureCreated { .. } => PipelineEventKind::TextureCreated,
            PipelineEvent::WeldApplied { .. } => PipelineEventKind::WeldApplied,
            PipelineEvent::WeldSkipped { .. } => PipelineEventKind::WeldSkipped,
            PipelineEvent::Warning { .. } => PipelineEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`PipelineEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PipelineEvent);

    /// Whether events of `kind` should be built at all. Lets callers skip formatting.
    fn wants(&self, _kind: PipelineEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PipelineEvent) {}

    #[inline]
    fn wants(&self, _kind: PipelineEventKind) -> bool {
        false
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Debug, Default)]
pub struct VecSink {
    events: Vec<PipelineEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[PipelineEvent] {
        &self.events
    }

    /// Number of collected events of `kind`.
    pub fn count(&self, kind: PipelineEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }
}
