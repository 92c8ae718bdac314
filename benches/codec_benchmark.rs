//! Benchmarks for whole-image encode and decode.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use huffpix::bmp::{decode_bmp, encode_bmp};
use huffpix::{codec, EncodeOptions, RgbPlanes};

/// Generate a test image with gradient pattern.
fn generate_test_image(width: u32, height: u32) -> RgbPlanes {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            let b = (((x + y) * 127) / (width + height)) as u8;
            pixels.extend_from_slice(&[r, g, b]);
        }
    }
    RgbPlanes::from_interleaved_rgb(&pixels, width, height).unwrap()
}

/// Generate a test image with random-ish pattern (harder to compress).
fn generate_noisy_image(width: u32, height: u32) -> RgbPlanes {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    let mut seed = 12345u32;
    for _ in 0..(width * height * 3) {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        pixels.push((seed >> 16) as u8);
    }
    RgbPlanes::from_interleaved_rgb(&pixels, width, height).unwrap()
}

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Encode");

    for size in [64u32, 256, 512] {
        let pixel_bytes = size as u64 * size as u64 * 3;
        group.throughput(Throughput::Bytes(pixel_bytes));

        for (kind, planes) in [
            ("gradient", generate_test_image(size, size)),
            ("noise", generate_noisy_image(size, size)),
        ] {
            for (preset, options) in [
                ("lossless", EncodeOptions::lossless()),
                ("default", EncodeOptions::default()),
                ("smallest", EncodeOptions::smallest()),
            ] {
                group.bench_with_input(
                    BenchmarkId::new(format!("{kind}/{preset}"), format!("{size}x{size}")),
                    &planes,
                    |b, planes| {
                        b.iter(|| black_box(codec::encode(black_box(planes), &options).unwrap()));
                    },
                );
            }
        }
    }

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decode");

    for size in [64u32, 256, 512] {
        let pixel_bytes = size as u64 * size as u64 * 3;
        group.throughput(Throughput::Bytes(pixel_bytes));

        let container =
            codec::encode(&generate_noisy_image(size, size), &EncodeOptions::default()).unwrap();
        group.bench_with_input(
            BenchmarkId::new("noise/default", format!("{size}x{size}")),
            &container,
            |b, data| {
                b.iter(|| black_box(codec::decode(black_box(data)).unwrap()));
            },
        );
    }

    group.finish();
}

fn bitmap_benchmark(c: &mut Criterion) {
    let planes = generate_test_image(512, 512);
    let bmp = encode_bmp(&planes, None).unwrap();

    let mut group = c.benchmark_group("Bitmap");
    group.throughput(Throughput::Bytes(bmp.len() as u64));
    group.bench_function("decode_512", |b| {
        b.iter(|| black_box(decode_bmp(black_box(&bmp)).unwrap()));
    });
    group.bench_function("encode_512", |b| {
        b.iter(|| black_box(encode_bmp(black_box(&planes), None).unwrap()));
    });
    group.finish();
}

fn planes_benchmark(c: &mut Criterion) {
    let planes = generate_noisy_image(512, 512);
    let interleaved = planes.to_interleaved_rgb();

    let mut group = c.benchmark_group("Planes");
    group.throughput(Throughput::Bytes(interleaved.len() as u64));
    group.bench_function("split_512", |b| {
        b.iter(|| {
            black_box(RgbPlanes::from_interleaved_rgb(black_box(&interleaved), 512, 512).unwrap())
        });
    });
    group.bench_function("interleave_512", |b| {
        b.iter(|| black_box(black_box(&planes).to_interleaved_rgb()));
    });
    group.finish();
}

criterion_group!(
    benches,
    encode_benchmark,
    decode_benchmark,
    bitmap_benchmark,
    planes_benchmark
);
criterion_main!(benches);
