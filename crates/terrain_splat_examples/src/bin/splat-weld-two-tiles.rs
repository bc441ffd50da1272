use terrain_splat::prelude::*;
use terrain_splat_examples::{init_tracing, save_textures_row_png, value_noise_heights};

const RESOLUTION: i32 = 128;
const SEED: u64 = 42;
const CONTROL: &str = "_ControlTex0";

/// Generators of one tile: height band, slope edges, and the splat producer.
fn generators() -> (HeightFilter, EdgeDetector, SplatOutput) {
    let lowlands = HeightFilter::new("lowlands", "height", "lowlands").with_band(0.0, 90.0);
    let cliffs = EdgeDetector::new("cliffs", "height", "cliffs").with_kernel_size(KernelSize::X5);
    let splat = SplatOutput::new("splat")
        .with_layer(Layer::new("dirt", "dirt"))
        .with_layer(
            Layer::new("grass", "grass")
                .with_input("lowlands")
                .with_index(1)
                .with_opacity(0.8),
        )
        .with_layer(
            Layer::new("rock", "rock")
                .with_input("cliffs")
                .with_index(2),
        );
    (lowlands, cliffs, splat)
}

/// Generate, pack and materialize one tile, welding against whatever is ready in `store`.
fn build_tile(
    tile: TileCoord,
    config: &SplatConfig,
    store: &TileTextureStore,
    sink: &mut VecSink,
) -> anyhow::Result<Vec<NamedTexture>> {
    let rect = CoordRect::new(tile.0 * RESOLUTION, tile.1 * RESOLUTION, RESOLUTION, RESOLUTION);
    let ctx = GenerateContext::new(rect, TileSize::new(RESOLUTION, 500.0, 200.0), SEED);

    let mut results = ResultStore::new();
    results.commit("height", value_noise_heights(rect, SEED, 24));

    let (lowlands, cliffs, splat) = generators();
    run_generator(&lowlands, &ctx, &mut results, &(), sink);
    run_generator(&cliffs, &ctx, &mut results, &(), sink);
    run_generator(&splat, &ctx, &mut results, &(), sink);

    let producers = [splat];
    let packed = pack_channels(&ctx, &results, &producers, config, None, &(), sink)
        .ok_or(Error::Other("packing stopped".into()))?;
    materialize(tile, packed, config, store, &(), sink)
        .ok_or_else(|| Error::Other("materialize stopped".into()).into())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SplatConfig::default().with_weld_margin(4);
    config.validate()?;

    let (left, right) = (TileCoord(0, 0), TileCoord(1, 0));
    let mut store = TileTextureStore::new();
    let mut sink = VecSink::new();

    // Left tile finishes first and has no ready neighbor to weld against.
    let textures = build_tile(left, &config, &store, &mut sink)?;
    store.insert(left, textures);
    store.mark_ready(left, config.weld_margin, &mut sink)?;

    // Right tile welds against the ready left tile while materializing.
    let textures = build_tile(right, &config, &store, &mut sink)?;
    store.insert(right, textures);
    store.mark_ready(right, config.weld_margin, &mut sink)?;

    let left_tex = store
        .texture(left, CONTROL)
        .ok_or(Error::UnknownTile { tile: left })?;
    let right_tex = store
        .texture(right, CONTROL)
        .ok_or(Error::UnknownTile { tile: right })?;

    let last = left_tex.width() - 1;
    let seam = (0..left_tex.height())
        .map(|y| (left_tex.pixel(last, y) - right_tex.pixel(0, y)).abs().max_element())
        .fold(0.0f32, f32::max);
    tracing::info!(
        "Largest control difference across the seam: {seam:.6} ({} welds applied).",
        sink.count(PipelineEventKind::WeldApplied)
    );

    save_textures_row_png(&[left_tex, right_tex], "splat-weld-two-tiles.png")?;
    Ok(())
}
