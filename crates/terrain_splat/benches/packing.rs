mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use terrain_splat::prelude::{
    pack_channels, CoordRect, GenerateContext, Layer, ResultStore, SplatConfig, SplatMode,
    SplatOutput, StaticClusters, TileSize,
};

const PRODUCER_COUNTS: [usize; 4] = [1, 4, 8, 16];
const LAYERS_PER_PRODUCER: usize = 4;
const TILE_SIDE: i32 = 256;

fn setup(producers: usize) -> (GenerateContext, ResultStore, Vec<SplatOutput>) {
    let rect = CoordRect::new(0, 0, TILE_SIDE, TILE_SIDE);
    let ctx = GenerateContext::new(rect, TileSize::new(TILE_SIDE, 1000.0, 200.0), 0);
    let mut results = ResultStore::new();
    let mut list = Vec::with_capacity(producers);

    for p in 0..producers {
        let mask = format!("biome_{p}");
        results.commit(mask.clone(), common::rolling_grid(rect, p as f32 * 0.7));

        let mut producer = SplatOutput::new(format!("producer_{p}")).with_biome_mask(mask);
        for l in 0..LAYERS_PER_PRODUCER {
            let output = format!("p{p}_l{l}");
            results.commit(
                output.clone(),
                common::rolling_grid(rect, (p * LAYERS_PER_PRODUCER + l) as f32),
            );
            producer = producer.with_layer(
                Layer::new(output.clone(), output).with_index((p + l) % 8),
            );
        }
        list.push(producer);
    }

    (ctx, results, list)
}

fn packing_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing/pack_channels");
    let config = SplatConfig::new(SplatMode::Cts);

    for &count in &PRODUCER_COUNTS {
        let (ctx, results, producers) = setup(count);
        group.throughput(common::cells_throughput(ctx.rect));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let out = pack_channels(&ctx, &results, &producers, &config, None, &(), &mut ());
                black_box(out);
            });
        });
    }

    group.finish();
}

fn cluster_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing/rank_clusters");
    let config = SplatConfig::new(SplatMode::MegaSplat).with_smooth_falloff(true);
    let clusters = StaticClusters::identity(8);

    for &count in &PRODUCER_COUNTS {
        let (ctx, results, producers) = setup(count);
        group.throughput(common::cells_throughput(ctx.rect));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let out = pack_channels(
                    &ctx,
                    &results,
                    &producers,
                    &config,
                    Some(&clusters),
                    &(),
                    &mut (),
                );
                black_box(out);
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = packing_benches, cluster_benches
}
criterion_main!(benches);
