//! Performance benchmarks for oxipix-lzhf
//!
//! Covers:
//! - Compression/decompression speed for two-stage and single-stage pipelines
//! - Pixel-like data patterns (flat fills, gradients, checkerboards, noise)
//! - Throughput (MB/s) across input sizes
//! - The Huffman stage on its own

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxipix_lzhf::{LzssParams, Pipeline, huffman_compress, huffman_decompress};
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Pixel buffers of a given length (RGB, 64 pixels per row)
mod test_data {
    const ROW: usize = 64 * 3;

    /// One flat color
    pub fn flat(size: usize) -> Vec<u8> {
        [0x20, 0x80, 0xC0].iter().copied().cycle().take(size).collect()
    }

    /// Horizontal gradient
    pub fn gradient(size: usize) -> Vec<u8> {
        (0..size).map(|i| ((i % ROW) / 3 * 4) as u8).collect()
    }

    /// 8x8 checkerboard
    pub fn checkerboard(size: usize) -> Vec<u8> {
        (0..size)
            .map(|i| {
                let (x, y) = ((i % ROW) / 3, i / ROW);
                if (x / 8 + y / 8) % 2 == 0 { 0 } else { 255 }
            })
            .collect()
    }

    /// Sensor-like noise
    pub fn noise(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            // Linear congruential generator
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }
}

/// Standard data sizes for benchmarking
mod data_sizes {
    pub const SMALL: usize = 4 * 1024; // 4 KB
    pub const MEDIUM: usize = 64 * 1024; // 64 KB
    pub const LARGE: usize = 512 * 1024; // 512 KB
}

const PATTERNS: [(&str, PatternGenerator); 4] = [
    ("flat", test_data::flat as PatternGenerator),
    ("gradient", test_data::gradient as PatternGenerator),
    ("checkerboard", test_data::checkerboard as PatternGenerator),
    ("noise", test_data::noise as PatternGenerator),
];

fn pipelines() -> [(&'static str, Pipeline); 2] {
    [
        ("lzss_huffman", Pipeline::default()),
        (
            "lzss_only",
            Pipeline::single_stage(LzssParams::DEFAULT).unwrap(),
        ),
    ]
}

/// Benchmark compression of each pattern with both pipelines
fn bench_compression_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_patterns");
    let size = data_sizes::MEDIUM;

    for (mode, pipeline) in pipelines() {
        for (pattern, generator) in PATTERNS {
            let data = generator(size);
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(mode, pattern),
                &data,
                |b, data| {
                    b.iter(|| black_box(pipeline.compress(black_box(data)).unwrap()));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark decompression of each pattern with both pipelines
fn bench_decompression_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompression_patterns");
    let size = data_sizes::MEDIUM;

    for (mode, pipeline) in pipelines() {
        for (pattern, generator) in PATTERNS {
            let compressed = pipeline.compress(&generator(size)).unwrap();
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(mode, pattern),
                &compressed,
                |b, compressed| {
                    b.iter(|| black_box(pipeline.decompress(black_box(compressed)).unwrap()));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark compression speed for different input sizes
fn bench_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip_sizes");
    group.sample_size(10);
    let pipeline = Pipeline::default();

    for (name, size) in [
        ("4KB", data_sizes::SMALL),
        ("64KB", data_sizes::MEDIUM),
        ("512KB", data_sizes::LARGE),
    ] {
        let data = test_data::gradient(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let compressed = pipeline.compress(black_box(data)).unwrap();
                black_box(pipeline.decompress(&compressed).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark the Huffman stage alone
fn bench_huffman(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman");
    let size = data_sizes::MEDIUM;

    for (pattern, generator) in PATTERNS {
        let data = generator(size);
        let block = huffman_compress(&data).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", pattern), &data, |b, data| {
            b.iter(|| black_box(huffman_compress(black_box(data)).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode", pattern), &block, |b, block| {
            b.iter(|| black_box(huffman_decompress(black_box(block)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compression_patterns,
    bench_decompression_patterns,
    bench_sizes,
    bench_huffman
);
criterion_main!(benches);
