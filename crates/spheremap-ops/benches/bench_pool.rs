use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use spheremap_grid::{CpuAllocator, Grid, GridSize, IdxMask, SampleMap};
use spheremap_ops::{
    idx_sentinel, mapped_max_pool, mapped_max_pool_backward, InterpolationMode,
};

const KERNEL_SIZE: usize = 9;

/// A 3x3 neighborhood map at double stride, halving the geometry.
fn neighborhood_map(src_size: GridSize) -> (GridSize, SampleMap) {
    let out_size = GridSize {
        width: src_size.width / 2,
        height: src_size.height / 2,
    };
    let map = SampleMap::from_fn(
        out_size,
        src_size,
        KERNEL_SIZE,
        1,
        CpuAllocator,
        |oh, ow, k, _| {
            let dx = (k % 3) as f32 - 1.0;
            let dy = (k / 3) as f32 - 1.0;
            (ow as f32 * 2.0 + dx, oh as f32 * 2.0 + dy)
        },
    )
    .unwrap();
    (out_size, map)
}

fn bench_mapped_max_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("MappedMaxPool");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let src_size = [*width, *height].into();
        let src =
            Grid::from_size_fn(src_size, 3, CpuAllocator, |y, x, c| (y * x + c) as f32).unwrap();
        let (out_size, map) = neighborhood_map(src_size);
        let output = Grid::from_size_val(out_size, 3, 0.0f32, CpuAllocator).unwrap();
        let mask =
            IdxMask::from_size_val(out_size, 3, idx_sentinel(KERNEL_SIZE), CpuAllocator).unwrap();

        group.bench_with_input(
            BenchmarkId::new("nearest", &parameter_string),
            &(&src, &map, &output, &mask),
            |b, i| {
                let (src, map, mut dst, mut mask) =
                    (i.0.clone(), i.1.clone(), i.2.clone(), i.3.clone());
                b.iter(|| {
                    mapped_max_pool(
                        black_box(&src),
                        black_box(&map),
                        black_box(&mut dst),
                        black_box(&mut mask),
                        black_box(InterpolationMode::Nearest),
                    )
                })
            },
        );
    }
    group.finish();
}

fn bench_mapped_max_pool_backward(c: &mut Criterion) {
    let mut group = c.benchmark_group("MappedMaxPoolBackward");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let src_size = [*width, *height].into();
        let src =
            Grid::from_size_fn(src_size, 3, CpuAllocator, |y, x, c| (y * x + c) as f32).unwrap();
        let (out_size, map) = neighborhood_map(src_size);
        let mut pooled = Grid::from_size_val(out_size, 3, 0.0f32, CpuAllocator).unwrap();
        let mut mask =
            IdxMask::from_size_val(out_size, 3, idx_sentinel(KERNEL_SIZE), CpuAllocator).unwrap();
        mapped_max_pool(&src, &map, &mut pooled, &mut mask, InterpolationMode::Nearest).unwrap();

        let grad_output = Grid::from_size_val(out_size, 3, 1.0f32, CpuAllocator).unwrap();
        let grad_input = Grid::from_size_val(src_size, 3, 0.0f32, CpuAllocator).unwrap();

        group.bench_with_input(
            BenchmarkId::new("nearest", &parameter_string),
            &(&grad_output, &mask, &map, &grad_input),
            |b, i| {
                let (grad_output, mask, map, mut grad_input) =
                    (i.0.clone(), i.1.clone(), i.2.clone(), i.3.clone());
                b.iter(|| {
                    mapped_max_pool_backward(
                        black_box(&grad_output),
                        black_box(&mask),
                        black_box(&map),
                        black_box(&mut grad_input),
                        black_box(InterpolationMode::Nearest),
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_mapped_max_pool, bench_mapped_max_pool_backward);
criterion_main!(benches);
