use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pantry_scan::config::ScanConfig;
use pantry_scan::engine::linescan::LineScanEngine;
use pantry_scan::models::QualityTier;
use pantry_scan::orchestrator::tier_settings;

mod common;

fn bench_default_tier(c: &mut Criterion) {
    let engine = LineScanEngine::new();
    let img = common::ean13_image("4006381333931", 4, 120);
    let settings = tier_settings(QualityTier::Default, &ScanConfig::default());
    c.bench_function("linescan_default_tier", |b| {
        b.iter(|| engine.decode_image(black_box(&img), &settings))
    });
}

fn bench_high_tier(c: &mut Criterion) {
    let engine = LineScanEngine::new();
    let img = common::ean13_image("4006381333931", 4, 120);
    let settings = tier_settings(QualityTier::High, &ScanConfig::default());
    c.bench_function("linescan_high_tier", |b| {
        b.iter(|| engine.decode_image(black_box(&img), &settings))
    });
}

fn bench_blank_image(c: &mut Criterion) {
    let engine = LineScanEngine::new();
    let img = image::DynamicImage::new_luma8(640, 480);
    let settings = tier_settings(QualityTier::High, &ScanConfig::default());
    c.bench_function("linescan_blank_640x480", |b| {
        b.iter(|| engine.decode_image(black_box(&img), &settings))
    });
}

criterion_group!(benches, bench_default_tier, bench_high_tier, bench_blank_image);
criterion_main!(benches);
