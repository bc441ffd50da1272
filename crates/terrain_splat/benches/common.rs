use std::time::Duration;

use criterion::{Criterion, Throughput};
use terrain_splat::prelude::{CoordRect, Grid};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub const TILE_SIDES: [i32; 3] = [64, 256, 512];

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn cells_throughput(rect: CoordRect) -> Throughput {
    Throughput::Elements(rect.area().max(1) as u64)
}

/// Rolling terrain-like heights in `[0, 1]`, deterministic per `phase`.
pub fn rolling_grid(rect: CoordRect, phase: f32) -> Grid {
    Grid::from_fn(rect, |x, z| {
        let (fx, fz) = (x as f32 * 0.031 + phase, z as f32 * 0.017 - phase);
        0.5 + 0.25 * fx.sin() + 0.25 * (fz * 1.3).cos()
    })
}
