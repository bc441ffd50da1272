//! Kernel convolution over grids.
//!
//! Taps that fall outside the source rect are skipped. There is no padding and no
//! renormalization by the number of valid taps, so cells near the rect border see fewer
//! contributions than interior cells.
use super::grid::Grid;
use super::kernel::{EdgeKernels, Kernel};

/// Convolve `kernel` with `src` centered on the global cell `(x, z)`.
pub fn apply(src: &Grid, kernel: &Kernel, x: i32, z: i32) -> f32 {
    let half = kernel.half() as i32;
    let mut result = 0.0;
    for (i, j, w) in kernel.taps() {
        let nx = x + (j as i32 - half);
        let nz = z + (i as i32 - half);
        if let Some(v) = src.try_get(nx, nz) {
            result += w * v;
        }
    }
    result
}

/// Convolve at `(x, z)` and add the absolute response into `dst`.
///
/// `(x, z)` must lie inside `dst`.
pub fn apply_to_destination(src: &Grid, kernel: &Kernel, dst: &mut Grid, x: i32, z: i32) {
    let response = apply(src, kernel, x, z);
    *dst.get_mut(x, z) += response.abs();
}

/// Accumulate `|src * kernel|` into `dst` for every cell, row-major.
pub fn accumulate_rows(src: &Grid, kernel: &Kernel, dst: &mut Grid) {
    let min = src.rect().min();
    let max = src.rect().max();
    for z in min.z..max.z {
        for x in min.x..max.x {
            apply_to_destination(src, kernel, dst, x, z);
        }
    }
}

/// Accumulate `|src * kernel|` into `dst` for every cell, column-major.
pub fn accumulate_columns(src: &Grid, kernel: &Kernel, dst: &mut Grid) {
    let min = src.rect().min();
    let max = src.rect().max();
    for x in min.x..max.x {
        for z in min.z..max.z {
            apply_to_destination(src, kernel, dst, x, z);
        }
    }
}

/// L1 gradient magnitude: the horizontal response summed with the vertical response.
pub fn detect_edges(src: &Grid, kernels: &EdgeKernels) -> Grid {
    let mut dst = Grid::new(src.rect());
    accumulate_rows(src, &kernels.horizontal, &mut dst);
    accumulate_columns(src, &kernels.vertical, &mut dst);
    dst
}
