//! Materialized tile textures.
//!
//! A [`TileTexture`] keeps two pixel arrays: the live pixels handed to the material and an
//! immutable copy of the pixels as they were created. Welding always reads the creation-time
//! copy of both tiles, so repeated welds give the same result.
use glam::Vec4;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::splat::PackedBuffer;

/// Byte layout used when exporting pixels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    #[default]
    Rgba32,
    Argb32,
}

impl TextureFormat {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Reorder an RGBA pixel into this format's channel order.
    #[inline]
    pub fn order(self, rgba: Vec4) -> Vec4 {
        match self {
            TextureFormat::Rgba32 => rgba,
            TextureFormat::Argb32 => Vec4::new(rgba.w, rgba.x, rgba.y, rgba.z),
        }
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// RGBA float texture, row-major with `x` fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct TileTexture {
    width: usize,
    height: usize,
    pixels: Vec<Vec4>,
    source: Vec<Vec4>,
}

impl TileTexture {
    pub fn new(width: usize, height: usize) -> Self {
        let pixels = vec![Vec4::ZERO; width * height];
        Self {
            width,
            height,
            source: pixels.clone(),
            pixels,
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Vec4>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(Error::GridSize {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            source: pixels.clone(),
            pixels,
        })
    }

    /// Texture with one pixel per buffer cell.
    pub fn from_buffer(buffer: PackedBuffer) -> Self {
        let rect = buffer.rect();
        let pixels = buffer.into_cells();
        Self {
            width: rect.size.x.max(0) as usize,
            height: rect.size.z.max(0) as usize,
            source: pixels.clone(),
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn same_size(&self, other: &TileTexture) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Pixels as they were when the texture was created.
    pub fn source(&self) -> &[Vec4] {
        &self.source
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Vec4 {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn source_pixel(&self, x: usize, y: usize) -> Vec4 {
        self.source[self.index(x, y)]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, value: Vec4) {
        let i = self.index(x, y);
        self.pixels[i] = value;
    }

    /// Undo every weld.
    pub fn reset(&mut self) {
        self.pixels.copy_from_slice(&self.source);
    }

    /// Export live pixels as 8-bit channels in `format` order.
    pub fn to_bytes(&self, format: TextureFormat) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * TextureFormat::BYTES_PER_PIXEL);
        for p in &self.pixels {
            let p = format.order(*p);
            bytes.extend_from_slice(&[to_byte(p.x), to_byte(p.y), to_byte(p.z), to_byte(p.w)]);
        }
        bytes
    }
}

/// A texture bound to a material slot name.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTexture {
    pub name: String,
    pub texture: TileTexture,
}
