//! Criterion benchmarks for vibra effect kernels
//!
//! Run with: cargo bench -p vibra-effects
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vibra_core::{KernelFactory, KernelOptions, ParameterStore, ProcessSpec};
use vibra_effects::{Chorus, ChorusAm, Compressor, Delay, Distortion, GainClip, Phaser, Tremolo};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_kernel<K: KernelFactory>(c: &mut Criterion, name: &str, setup: impl Fn(&ParameterStore)) {
    let mut group = c.benchmark_group(name);
    let params = ParameterStore::new(K::PARAMS);
    setup(&params);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        let spec = ProcessSpec::new(SAMPLE_RATE, block_size, 2);
        let mut kernel = K::create(&spec, &KernelOptions::default(), &params);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut left = input.clone();
                let mut right = input.clone();
                b.iter(|| {
                    left.copy_from_slice(&input);
                    right.copy_from_slice(&input);
                    kernel.process(&mut [&mut left, &mut right], &params);
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_tremolo(c: &mut Criterion) {
    bench_kernel::<Tremolo>(c, "Tremolo", |p| {
        p.set("depth", 0.8);
    });
}

fn bench_delay(c: &mut Criterion) {
    bench_kernel::<Delay>(c, "Delay", |p| {
        p.set("delay", 0.3);
        p.set("feedback", 0.6);
    });
}

fn bench_chorus(c: &mut Criterion) {
    bench_kernel::<Chorus>(c, "Chorus", |_| {});
    bench_kernel::<ChorusAm>(c, "ChorusAm", |_| {});
}

fn bench_distortion(c: &mut Criterion) {
    for mode in [1.0, 4.0, 7.0, 9.0] {
        bench_kernel::<Distortion>(c, &format!("Distortion/mode{mode}"), |p| {
            p.set("mode", mode);
            p.set("gain", 2.0);
        });
    }
    bench_kernel::<GainClip>(c, "GainClip", |_| {});
}

fn bench_phaser(c: &mut Criterion) {
    bench_kernel::<Phaser>(c, "Phaser", |p| {
        p.set("rate", 0.5);
        p.set("centre", 80.0);
    });
}

fn bench_compressor(c: &mut Criterion) {
    bench_kernel::<Compressor>(c, "Compressor", |p| {
        p.set("threshold", -20.0);
        p.set("ratio", 4.0);
    });
}

criterion_group!(
    benches,
    bench_tremolo,
    bench_delay,
    bench_chorus,
    bench_distortion,
    bench_phaser,
    bench_compressor
);
criterion_main!(benches);
