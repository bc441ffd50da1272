//! Edge-detection kernel construction.
//!
//! [`EdgeKernels::build`] produces a horizontal/vertical pair of square derivative kernels
//! that generalize the 3×3 Sobel operator to apertures of 5, 7 and 9. The horizontal kernel
//! is antisymmetric about its center column and the vertical kernel is its transpose.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Supported kernel apertures.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KernelSize {
    #[default]
    X3,
    X5,
    X7,
    X9,
}

impl KernelSize {
    pub const ALL: [KernelSize; 4] = [
        KernelSize::X3,
        KernelSize::X5,
        KernelSize::X7,
        KernelSize::X9,
    ];

    /// Coerce a free integer into a supported size: clamp to `[3, 9]`, then round even
    /// values up to the next odd one.
    pub fn coerce(requested: i32) -> Self {
        let mut n = requested.clamp(3, 9);
        if n % 2 == 0 {
            n += 1;
        }
        match n {
            3 => KernelSize::X3,
            5 => KernelSize::X5,
            7 => KernelSize::X7,
            _ => KernelSize::X9,
        }
    }

    /// Side length of the kernel.
    pub fn dim(self) -> usize {
        match self {
            KernelSize::X3 => 3,
            KernelSize::X5 => 5,
            KernelSize::X7 => 7,
            KernelSize::X9 => 9,
        }
    }
}

/// A square kernel stored row-major. `weights[i * dim + j]` is row `i`, column `j`.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    dim: usize,
    weights: Vec<f32>,
}

impl Kernel {
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn half(&self) -> usize {
        self.dim / 2
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f32 {
        self.weights[i * self.dim + j]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Nonzero taps as `(row, column, weight)`.
    pub fn taps(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(move |(idx, w)| (idx / self.dim, idx % self.dim, *w))
    }
}

/// Horizontal and vertical derivative kernels of one size.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeKernels {
    pub size: KernelSize,
    pub horizontal: Kernel,
    pub vertical: Kernel,
}

impl EdgeKernels {
    pub fn build(size: KernelSize) -> Self {
        let n = size.dim();
        let half = n / 2;
        let mut h = vec![0.0f32; n * n];
        let mut v = vec![0.0f32; n * n];

        for i in 0..n {
            // Ramp pivot grows toward the center row and falls off symmetrically after it.
            let k = if i <= half {
                (half + i) as i32
            } else {
                (n + half - i - 1) as i32
            };

            for j in 0..n {
                let w = if j < half {
                    j as i32 - k
                } else if j > half {
                    k - (n - j - 1) as i32
                } else {
                    0
                } as f32;
                h[i * n + j] = w;
                v[j * n + i] = w;
            }
        }

        Self {
            size,
            horizontal: Kernel { dim: n, weights: h },
            vertical: Kernel { dim: n, weights: v },
        }
    }
}
