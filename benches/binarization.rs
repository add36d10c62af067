use criterion::{Criterion, black_box, criterion_group, criterion_main};
use maze_vision::ThresholdParams;
use maze_vision::utils::binarization::{bradley_binarize, global_threshold_binarize};
use maze_vision::utils::integral::IntegralImage;

fn textured(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .map(|i| ((i % width) / 3 + (i / width) / 2) as u8)
        .collect()
}

fn bench_integral_image_medium(c: &mut Criterion) {
    let gray = textured(640, 480);
    c.bench_function("integral_image_640x480", |b| {
        b.iter(|| IntegralImage::build(black_box(&gray), black_box(640), black_box(480)))
    });
}

fn bench_bradley_binarize_medium(c: &mut Criterion) {
    let gray = textured(640, 480);
    let params = ThresholdParams::for_width(640);
    c.bench_function("bradley_binarize_640x480", |b| {
        b.iter(|| {
            bradley_binarize(
                black_box(&gray),
                black_box(640),
                black_box(480),
                black_box(&params),
            )
        })
    });
}

fn bench_bradley_binarize_large(c: &mut Criterion) {
    let gray = textured(1920, 1080);
    let params = ThresholdParams::for_width(1920);
    c.bench_function("bradley_binarize_1920x1080", |b| {
        b.iter(|| {
            bradley_binarize(
                black_box(&gray),
                black_box(1920),
                black_box(1080),
                black_box(&params),
            )
        })
    });
}

fn bench_global_threshold_binarize_medium(c: &mut Criterion) {
    let gray = textured(640, 480);
    c.bench_function("global_threshold_binarize_640x480", |b| {
        b.iter(|| {
            global_threshold_binarize(
                black_box(&gray),
                black_box(640),
                black_box(480),
                black_box(128),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_integral_image_medium,
    bench_bradley_binarize_medium,
    bench_bradley_binarize_large,
    bench_global_threshold_binarize_medium
);
criterion_main!(benches);
