#![forbid(unsafe_code)]
//! terrain_splat: Raster generators for tiled terrain and splat-control texture assembly.
//!
//! Modules:
//! - raster: grids in global cell space, edge kernels and convolution, layer blending
//! - generator: port-based generators (edge detection, height band, splat producer), stop
//!   signals, events
//! - splat: channel packing and dual-layer cluster ranking into control buffers
//! - tile: texture materialization, cross-tile welding, and the texture store
//!
//! For a walkthrough, see README and the `terrain_splat_examples` binaries.
pub mod config;
pub mod error;
pub mod generator;
pub mod raster;
pub mod splat;
pub mod tile;

/// Convenient re-exports for common types. Import with `use terrain_splat::prelude::*;`.
pub mod prelude {
    pub use crate::config::SplatConfig;
    pub use crate::error::{Error, Result};
    pub use crate::generator::events::VecSink;
    pub use crate::generator::{
        run_generator, EdgeDetector, EventSink, GenerateContext, Generator, GeneratorState,
        HeightFilter, PipelineEvent, PipelineEventKind, ResultStore, SkipReason, SplatOutput,
        StopFlag, StopSignal, TileSize,
    };
    pub use crate::raster::{
        blend_layers, detect_edges, Coord, CoordRect, Direction, EdgeKernels, Grid, KernelSize,
        TileCoord,
    };
    pub use crate::splat::{
        pack_channels, ChannelPacker, ClusterLookup, Layer, PackedBuffer, PackedOutput,
        SplatMode, StaticClusters,
    };
    pub use crate::tile::{
        materialize, MaterializeStep, Materializer, NamedTexture, NeighborAccess, TextureFormat,
        TileTexture, TileTextureStore,
    };
}
