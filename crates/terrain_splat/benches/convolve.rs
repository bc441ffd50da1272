mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use terrain_splat::prelude::{detect_edges, CoordRect, EdgeKernels, KernelSize};

fn detect_edges_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve/detect_edges");

    for &side in &common::TILE_SIDES {
        let rect = CoordRect::new(0, 0, side, side);
        let src = common::rolling_grid(rect, 0.0);
        group.throughput(common::cells_throughput(rect));

        for size in KernelSize::ALL {
            let kernels = EdgeKernels::build(size);
            group.bench_with_input(
                BenchmarkId::new(format!("x{}", size.dim()), side),
                &side,
                |b, _| {
                    b.iter(|| {
                        let dst = detect_edges(black_box(&src), &kernels);
                        black_box(dst);
                    });
                },
            );
        }
    }

    group.finish();
}

fn kernel_build_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve/build_kernels");
    for size in KernelSize::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(size.dim()), &size, |b, &size| {
            b.iter(|| black_box(EdgeKernels::build(black_box(size))));
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = detect_edges_benches, kernel_build_benches
}
criterion_main!(benches);
