use terrain_splat::prelude::*;
use terrain_splat_examples::{init_tracing, save_grid_png, value_noise_heights};

const RESOLUTION: i32 = 256;
const TERRAIN_HEIGHT: f32 = 200.0;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let rect = CoordRect::new(0, 0, RESOLUTION, RESOLUTION);
    let ctx = GenerateContext::new(rect, TileSize::new(RESOLUTION, 1000.0, TERRAIN_HEIGHT), 7);

    let mut results = ResultStore::new();
    results.commit("height", value_noise_heights(rect, ctx.seed, 32));

    // Band of mid-altitude terrain (60..120 world units of a 200 unit range).
    let band = HeightFilter::new("band", "height", "band").with_band(60.0, 120.0);
    // Outline of the band and raw slope of the heights, with different apertures.
    let outline = EdgeDetector::new("outline", "band", "outline");
    let slope = EdgeDetector::new("slope", "height", "slope").with_kernel_size(KernelSize::X7);

    let mut sink = VecSink::new();
    for generator in [&band as &dyn Generator, &outline, &slope] {
        run_generator(generator, &ctx, &mut results, &(), &mut sink);
    }

    for port in ["height", "band", "outline", "slope"] {
        let grid = results
            .get(port)
            .ok_or(Error::MissingInput { port: port.into() })?;
        save_grid_png(grid, format!("edges-heightmap-{port}.png"))?;
    }

    tracing::info!(
        "Committed {} outputs.",
        sink.count(PipelineEventKind::OutputCommitted)
    );
    Ok(())
}
