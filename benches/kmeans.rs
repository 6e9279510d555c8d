#[path = "../util/util.rs"]
mod util;

use util::bench_images;

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use seedmeans::{kmeans, DistanceMode, KmeansOptions, PlanarBuffer};

/// Spreads `k` seed points along the image diagonal.
fn diagonal_seeds(image: &PlanarBuffer, k: u32) -> KmeansOptions {
    let (width, height) = image.dimensions();
    KmeansOptions::from_points(
        (0..k).map(|i| ((i * width) / k, (i * height) / k)),
    )
}

fn bench(
    c: &mut Criterion,
    group: &str,
    images: &[(String, PlanarBuffer)],
    mut f: impl FnMut(&mut Bencher<WallTime>, &(u32, &PlanarBuffer)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(20)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (k, secs) in [(2, 2), (8, 3), (32, 4)] {
        group.measurement_time(Duration::from_secs(secs));
        for (path, image) in images {
            group.bench_with_input(BenchmarkId::new(k.to_string(), path), &(k, image), &mut f);
        }
    }
}

fn kmeans_exact(c: &mut Criterion) {
    bench(c, "kmeans_exact", bench_images(), |b, &(k, image)| {
        let options = diagonal_seeds(image, k);
        b.iter(|| kmeans::quantize(image.as_image(), &options).unwrap())
    })
}

fn kmeans_wrapping(c: &mut Criterion) {
    bench(c, "kmeans_wrapping", bench_images(), |b, &(k, image)| {
        let options = diagonal_seeds(image, k).distance_mode(DistanceMode::Wrapping);
        b.iter(|| kmeans::quantize(image.as_image(), &options).unwrap())
    })
}

fn kmeans_into(c: &mut Criterion) {
    bench(c, "kmeans_into", bench_images(), |b, &(k, image)| {
        let options = diagonal_seeds(image, k);
        let mut output = PlanarBuffer::sentinel(image.width(), image.height()).unwrap();
        b.iter(|| kmeans::quantize_into(image.as_image(), &options, &mut output, |_| {}).unwrap())
    })
}

criterion_group!(benches, kmeans_exact, kmeans_wrapping, kmeans_into);
criterion_main!(benches);
