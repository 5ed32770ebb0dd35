extern crate fasscope;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fasscope::{
    config::{DecompilerConfig, ResolverConfig},
    strings::StringTableResolver,
    Decompiler,
};
use std::hint::black_box;

/// Synthetic payload: a pointer table, some length-prefixed records and noise.
fn synthetic_buffer(noise: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(noise + 1024);
    data.extend_from_slice(&16u32.to_le_bytes());
    data.extend_from_slice(&[0u8; 12]);
    for (index, text) in ["defun", "princ", "setq", "dict_name", "c:main"]
        .iter()
        .enumerate()
    {
        data.extend_from_slice(&(index as u32).to_le_bytes());
        data.extend_from_slice(&(text.len() as u32).to_le_bytes());
        data.extend_from_slice(text.as_bytes());
    }
    let mut state = 0x1234_5678_u32;
    for _ in 0..noise {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        data.push((state >> 16) as u8);
    }
    data
}

/// Full resolver with the keyed-transform scan forced on, across worker counts.
fn bench_resolver(c: &mut Criterion) {
    let buffer = synthetic_buffer(64 * 1024);
    let config = ResolverConfig {
        keyed_skip_threshold: None,
        ..ResolverConfig::default()
    };

    let mut group = c.benchmark_group("resolver");
    group.throughput(Throughput::Bytes(buffer.len() as u64));
    for workers in [1, 4, 0] {
        let resolver = StringTableResolver::new(config.clone(), workers);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &buffer, |b, buffer| {
            b.iter(|| black_box(resolver.resolve(black_box(buffer))));
        });
    }
    group.finish();
}

/// The whole pipeline on a framed container.
fn bench_pipeline(c: &mut Criterion) {
    let payload = synthetic_buffer(16 * 1024);
    let mut data = format!("FAS4-FILE ; bench\r\n{}\r\n", payload.len()).into_bytes();
    data.extend_from_slice(&payload);

    let decompiler = Decompiler::new(DecompilerConfig::default());
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("decompile", |b| {
        b.iter(|| black_box(decompiler.decompile(black_box(&data))));
    });
    group.finish();
}

criterion_group!(benches, bench_resolver, bench_pipeline);
criterion_main!(benches);
