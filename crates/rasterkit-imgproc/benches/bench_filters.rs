use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use rasterkit_image::{Image, Parallelism, Pixel};
use rasterkit_imgproc::filter::{filter2d, kernels, median_filter};
use rasterkit_imgproc::warp::linear_transform;
use rasterkit_linalg::Transform;

fn test_image(width: usize, height: usize) -> Image<Pixel> {
    Image::from_fn([width, height].into(), |x, y| {
        Pixel::rgb(x as u8, y as u8, (x * y) as u8)
    })
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filters");

    for (width, height) in [(256, 224), (512, 448)].iter() {
        for kernel_size in [3, 5, 9].iter() {
            group.throughput(criterion::Throughput::Elements(
                (*width * *height * *kernel_size) as u64,
            ));

            let parameter_string = format!("{}x{}x{}", width, height, kernel_size);
            let kernel = kernels::gaussian(*kernel_size, 1.5).unwrap();

            for (name, parallelism) in [
                ("serial", Parallelism::Serial),
                ("auto", Parallelism::Auto),
            ] {
                let image = test_image(*width, *height).with_parallelism(parallelism);
                group.bench_with_input(
                    BenchmarkId::new(format!("gaussian_{name}"), &parameter_string),
                    &image,
                    |b, i| b.iter(|| black_box(filter2d(i, &kernel))),
                );
            }

            let image = test_image(*width, *height);
            group.bench_with_input(
                BenchmarkId::new("median", &parameter_string),
                &image,
                |b, i| b.iter(|| black_box(median_filter(i, *kernel_size))),
            );
        }
    }
    group.finish();
}

fn bench_warp(c: &mut Criterion) {
    let mut group = c.benchmark_group("Warp");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));
        let parameter_string = format!("{}x{}", width, height);

        let image = test_image(*width, *height);
        let transform = Transform::identity()
            .translate(-(*width as f64) / 2.0, -(*height as f64) / 2.0)
            .rotate(0.3)
            .scale(1.2, 1.2)
            .translate(*width as f64 / 2.0, *height as f64 / 2.0);

        group.bench_with_input(
            BenchmarkId::new("rotate_scale", &parameter_string),
            &image,
            |b, i| b.iter(|| black_box(linear_transform(i, &transform, Pixel::BLACK))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_filters, bench_warp);
criterion_main!(benches);
