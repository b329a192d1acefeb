use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use rasterkit_image::{Image, Pixel};
use rasterkit_imgproc::frequency::{fft, ifft};
use rasterkit_imgproc::hough::{hough_transform, AngleFilter, HoughParams};
use rasterkit_imgproc::segmentation::{auto_threshold_otsu, split_region};

fn bench_hough(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hough");

    for size in [64, 128, 256].iter() {
        let parameter_string = format!("{}x{}", size, size);
        let grid = Image::from_fn([*size, *size].into(), |x, y| {
            if x == y || x == *size / 3 {
                1.0
            } else {
                0.0
            }
        });
        let params = HoughParams {
            theta_steps: 720,
            rho_steps: 512,
            rho_max: None,
        };

        group.bench_with_input(
            BenchmarkId::new("hough_transform", &parameter_string),
            &grid,
            |b, i| b.iter(|| black_box(hough_transform(i, &params, AngleFilter::All))),
        );
    }
    group.finish();
}

fn bench_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT");

    for size in [64, 128, 256, 512].iter() {
        group.throughput(criterion::Throughput::Elements((*size * *size) as u64));
        let parameter_string = format!("{}x{}", size, size);
        let grid = Image::from_fn([*size, *size].into(), |x, y| ((x * 31 + y * 17) % 255) as f64);

        group.bench_with_input(
            BenchmarkId::new("fft_ifft", &parameter_string),
            &grid,
            |b, i| b.iter(|| black_box(fft(i).and_then(|s| ifft(&s)))),
        );
    }
    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Segmentation");

    for (width, height) in [(256, 224), (512, 448)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));
        let parameter_string = format!("{}x{}", width, height);
        let image = Image::from_fn([*width, *height].into(), |x, y| {
            if (x / 16 + y / 16) % 2 == 0 {
                Pixel::WHITE
            } else {
                Pixel::gray_pixel(40)
            }
        });

        group.bench_with_input(
            BenchmarkId::new("otsu", &parameter_string),
            &image,
            |b, i| b.iter(|| black_box(auto_threshold_otsu(i))),
        );

        group.bench_with_input(
            BenchmarkId::new("split_region", &parameter_string),
            &image,
            |b, i| b.iter(|| black_box(split_region(i, Pixel::gray_pixel(40), 10.0))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_hough, bench_fft, bench_segmentation);
criterion_main!(benches);
