use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use rasterkit_image::{Image, Pixel};
use rasterkit_io::Bitmap;

fn bench_bmp(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bitmap");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image = Image::from_fn([*width, *height].into(), |x, y| {
            Pixel::rgb(x as u8, y as u8, (x ^ y) as u8)
        });
        let bitmap = Bitmap::new(image);
        let bytes = bitmap.encode().unwrap();

        group.bench_with_input(
            BenchmarkId::new("encode_24", &parameter_string),
            &bitmap,
            |b, i| b.iter(|| black_box(i.encode())),
        );

        group.bench_with_input(
            BenchmarkId::new("decode_24", &parameter_string),
            &bytes,
            |b, i| b.iter(|| black_box(Bitmap::decode(i))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_bmp);
criterion_main!(benches);
