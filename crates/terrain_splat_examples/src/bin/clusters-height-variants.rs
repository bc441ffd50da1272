use terrain_splat::prelude::*;
use terrain_splat_examples::{init_tracing, save_textures_row_png, value_noise_heights};

const RESOLUTION: i32 = 256;
const SEED: u64 = 3;

/// Each cluster owns a low and a high texture variant. The variant switches at a height
/// threshold that wobbles with world position, so the boundary is not a contour line.
struct HeightVariants {
    /// `(low, high)` texture index per cluster.
    variants: Vec<(usize, usize)>,
}

impl ClusterLookup for HeightVariants {
    fn cluster_count(&self) -> usize {
        self.variants.len()
    }

    fn texture_index(
        &self,
        cluster: usize,
        position: mint::Vector3<f32>,
        _normal: mint::Vector3<f32>,
        height_ratio: f32,
    ) -> usize {
        let p = glam::Vec3::from(position);
        let threshold = 0.5 + 0.1 * (p.x * 2.0).sin() * (p.z * 3.0).cos();
        let (low, high) = self.variants[cluster.min(self.variants.len() - 1)];
        if height_ratio < threshold {
            low
        } else {
            high
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let rect = CoordRect::new(0, 0, RESOLUTION, RESOLUTION);
    let ctx = GenerateContext::new(rect, TileSize::new(RESOLUTION, 1000.0, 200.0), SEED);
    let heights = value_noise_heights(rect, SEED, 48);
    let mut results = ResultStore::new().with_heights(heights.clone());
    results.commit("height", heights);

    let slope = EdgeDetector::new("slope", "height", "slope");
    let meadow = HeightFilter::new("meadow", "height", "meadow").with_band(0.0, 110.0);
    run_generator(&slope, &ctx, &mut results, &(), &mut ());
    run_generator(&meadow, &ctx, &mut results, &(), &mut ());

    let producer = SplatOutput::new("terrain")
        .with_layer(Layer::new("ground", "ground"))
        .with_layer(Layer::new("meadow", "meadow_cov").with_input("meadow").with_index(1))
        .with_layer(
            Layer::new("cliff", "cliff_cov")
                .with_input("slope")
                .with_index(2)
                .with_opacity(0.9),
        );
    run_generator(&producer, &ctx, &mut results, &(), &mut ());

    let config = SplatConfig::new(SplatMode::MegaSplat).with_smooth_falloff(true);
    config.validate()?;
    let clusters = HeightVariants {
        variants: vec![(0, 1), (2, 3), (4, 5)],
    };

    let producers = [producer];
    let packed = pack_channels(
        &ctx,
        &results,
        &producers,
        &config,
        Some(&clusters),
        &(),
        &mut (),
    )
    .ok_or(Error::Other("packing stopped".into()))?;
    let textures = materialize(TileCoord(0, 0), packed, &config, &(), &(), &mut ())
        .ok_or(Error::Other("materialize stopped".into()))?;

    let control = textures
        .iter()
        .find(|t| t.name == "_SplatControl")
        .ok_or(Error::MissingInput {
            port: "_SplatControl".into(),
        })?;
    save_textures_row_png(&[&control.texture], "clusters-height-variants.png")?;
    Ok(())
}
