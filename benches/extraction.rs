use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use copy_move_forensics::{
    DetectionConfig,
    analysis::copy_move::CopyMoveDetector,
    image_utils::SampleImage,
};

fn synthetic(width: u32, height: u32) -> SampleImage {
    let rgb = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 + y) as u8, (x ^ y) as u8, (x * y / 3) as u8])
    });
    SampleImage::from_rgb(&rgb)
}

fn bench_extraction(c: &mut Criterion) {
    let image = synthetic(64, 64);
    let mut group = c.benchmark_group("extract_features");

    for block_size in [2u32, 4, 8] {
        let detector = CopyMoveDetector::new(&DetectionConfig::default().with_block_size(block_size))
            .unwrap_or_else(|e| panic!("Invalid benchmark config: {}", e));

        group.bench_with_input(BenchmarkId::from_parameter(block_size), &block_size, |b, _| {
            b.iter(|| black_box(detector.extract_features(&image)))
        });
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let image = synthetic(64, 64);
    let detector = CopyMoveDetector::new(&DetectionConfig::default())
        .unwrap_or_else(|e| panic!("Invalid benchmark config: {}", e));

    c.bench_function("detect_64x64", |b| b.iter(|| black_box(detector.detect(&image))));
}

criterion_group!(benches, bench_extraction, bench_full_pipeline);
criterion_main!(benches);
