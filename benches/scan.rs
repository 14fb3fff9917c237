use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use fwprobe::engine::catalog;
use fwprobe::engine::scan::{find_all, CatalogScanner};
use fwprobe::engine::ScoreEngine;
use fwprobe::io::Sample;
use fwprobe::{AnalyzeOptions, Analyzer};

/// Pseudo-random image with a handful of firmware markers spread through it.
fn synthetic_image(len: usize) -> Vec<u8> {
    let mut state = 0x9E37_79B9u32;
    let mut data: Vec<u8> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        })
        .collect();
    let markers: [&[u8]; 6] = [
        b"U-Boot 2020.01",
        b"Linux version 5.4.0",
        b"hsqs",
        b"OpenWrt",
        b"BusyBox v1.33",
        b"bootcmd=bootm",
    ];
    for (i, marker) in markers.iter().enumerate() {
        let at = (i + 1) * len / (markers.len() + 1);
        data[at..at + marker.len()].copy_from_slice(marker);
    }
    data
}

fn bench_catalog_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog-scan");
    for size in [64 * 1024, 1024 * 1024, 4 * 1024 * 1024] {
        let data = synthetic_image(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("scan-{size}"), |b| {
            b.iter(|| CatalogScanner::global().scan(&data))
        });
    }
    group.finish();
}

fn bench_find_all(c: &mut Criterion) {
    let data = synthetic_image(1024 * 1024);
    let mut group = c.benchmark_group("find-all");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("squashfs-magic", |b| b.iter(|| find_all(&data, b"hsqs")));
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let data = synthetic_image(1024 * 1024);
    let hits = CatalogScanner::global().scan(&data);
    let engine = ScoreEngine::default();
    c.bench_function("rank-profiles", |b| {
        b.iter(|| engine.rank(catalog::profiles(), &hits))
    });
}

fn bench_analyze(c: &mut Criterion) {
    let data = synthetic_image(1024 * 1024);
    let analyzer = Analyzer::default();
    let options = AnalyzeOptions {
        extract: false,
        ..AnalyzeOptions::default()
    };
    c.bench_function("analyze-1mib", |b| {
        b.iter_batched(
            || Sample::from_bytes("image.bin", data.clone(), 4 * 1024 * 1024),
            |sample| analyzer.analyze_sample(&sample, &options),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_catalog_scan, bench_find_all, bench_rank, bench_analyze);
criterion_main!(benches);
