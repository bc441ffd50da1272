//! Raster primitives shared by every generator.
//!
//! This module groups the grid type addressed in global cell coordinates, the
//! edge-detection kernel builder and its convolution, and ordered layer blending.
pub mod blend;
pub mod convolve;
pub mod grid;
pub mod kernel;
pub mod rect;

pub use blend::blend_layers;
pub use convolve::detect_edges;
pub use grid::Grid;
pub use kernel::{EdgeKernels, Kernel, KernelSize};
pub use rect::{Coord, CoordRect, Direction, TileCoord};
