//! Performance benchmarks for the CrabSnap photo filters
//!
//! Run with: cargo bench
//!
//! Every filter runs over the whole working buffer after each tap in the
//! editor, so these track per-frame cost at common capture resolutions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crabsnap::filters::{adjust_brightness_contrast, FilterKind};
use crabsnap::testing::synthetic_frame;
use crabsnap::PixelBuffer;

const RESOLUTIONS: [(u32, u32, &str); 3] = [
    (640, 480, "480p"),
    (1280, 720, "720p"),
    (1920, 1080, "1080p"),
];

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filters");

    for (width, height, name) in RESOLUTIONS {
        if width == 1920 {
            group.sample_size(10);
        }
        let source = PixelBuffer::from(synthetic_frame(0, width, height));
        group.throughput(Throughput::Bytes(source.as_bytes().len() as u64));

        for kind in FilterKind::ALL {
            group.bench_with_input(BenchmarkId::new(kind.as_str(), name), &source, |b, source| {
                b.iter_batched(
                    || source.clone(),
                    |mut buffer| {
                        kind.apply(&mut buffer);
                        black_box(buffer)
                    },
                    criterion::BatchSize::LargeInput,
                )
            });
        }

        group.bench_with_input(
            BenchmarkId::new("brightness_contrast", name),
            &source,
            |b, source| {
                b.iter_batched(
                    || source.clone(),
                    |mut buffer| {
                        adjust_brightness_contrast(&mut buffer, 20.0, 35.0).ok();
                        black_box(buffer)
                    },
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_jpeg_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("JPEG Export");
    group.sample_size(20);

    for (width, height, name) in RESOLUTIONS {
        let buffer = PixelBuffer::from(synthetic_frame(0, width, height));
        group.bench_with_input(BenchmarkId::from_parameter(name), &buffer, |b, buffer| {
            b.iter(|| black_box(buffer.encode_jpeg(92)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filters, bench_jpeg_export);
criterion_main!(benches);
