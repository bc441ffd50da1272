#![forbid(unsafe_code)]

use std::path::Path;

use anyhow::{anyhow, Context};
use image::{GrayImage, Luma, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use terrain_splat::prelude::{CoordRect, Grid, TextureFormat, TileTexture};
use tracing::info;

/// Route `tracing` output through `env_logger`. Honors `RUST_LOG`, defaults to `info`.
pub fn init_tracing() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[inline]
pub fn rand01(rng: &mut dyn Rng) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Smooth value-noise heights in `[0, 1]` over `rect`.
///
/// Lattice values depend only on `seed` and the global lattice cell, so adjacent rects agree
/// along their shared border.
pub fn value_noise_heights(rect: CoordRect, seed: u64, cell: i32) -> Grid {
    let cell = cell.max(1);
    let lattice = |lx: i32, lz: i32| -> f32 {
        let key = seed
            ^ (lx as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (lz as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        let mut rng = StdRng::seed_from_u64(key);
        rand01(&mut rng)
    };
    let smooth = |t: f32| t * t * (3.0 - 2.0 * t);

    Grid::from_fn(rect, |x, z| {
        let (lx, lz) = (x.div_euclid(cell), z.div_euclid(cell));
        let tx = smooth(x.rem_euclid(cell) as f32 / cell as f32);
        let tz = smooth(z.rem_euclid(cell) as f32 / cell as f32);
        let top = lattice(lx, lz) * (1.0 - tx) + lattice(lx + 1, lz) * tx;
        let bottom = lattice(lx, lz + 1) * (1.0 - tx) + lattice(lx + 1, lz + 1) * tx;
        top * (1.0 - tz) + bottom * tz
    })
}

/// Write `grid` as an 8-bit grayscale PNG, mapping `[min, max]` of the data to `[0, 255]`.
pub fn save_grid_png(grid: &Grid, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let rect = grid.rect();
    let (min, max) = grid
        .data()
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let range = (max - min).max(f32::EPSILON);

    let img = GrayImage::from_fn(rect.size.x as u32, rect.size.z as u32, |x, y| {
        let v = grid.get(rect.offset.x + x as i32, rect.offset.z + y as i32);
        Luma([(((v - min) / range) * 255.0).round() as u8])
    });
    let path = path.as_ref();
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}.", path.display());
    Ok(())
}

/// Write textures next to each other, left to right, as one RGBA PNG.
///
/// All textures must share a height. Alpha is forced opaque so control data stays visible.
pub fn save_textures_row_png(
    textures: &[&TileTexture],
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let height = textures
        .first()
        .map(|t| t.height())
        .ok_or_else(|| anyhow!("no textures to write"))?;
    if textures.iter().any(|t| t.height() != height) {
        return Err(anyhow!("textures differ in height"));
    }
    let width: usize = textures.iter().map(|t| t.width()).sum();

    let mut img = RgbaImage::new(width as u32, height as u32);
    let mut x0 = 0u32;
    for texture in textures {
        let bytes = texture.to_bytes(TextureFormat::Rgba32);
        for (i, px) in bytes.chunks_exact(TextureFormat::BYTES_PER_PIXEL).enumerate() {
            let (x, y) = ((i % texture.width()) as u32, (i / texture.width()) as u32);
            img.put_pixel(x0 + x, y, image::Rgba([px[0], px[1], px[2], 255]));
        }
        x0 += texture.width() as u32;
    }

    let path = path.as_ref();
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}.", path.display());
    Ok(())
}
