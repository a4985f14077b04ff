//! Criterion benchmarks for vibra-core kernel primitives
//!
//! Run with: cargo bench -p vibra-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vibra_core::{
    DelayLine, DistortionMode, Interpolation, Lcg, Oscillator, ParamDescriptor, ParameterStore,
    ShaperSettings, StateCodec, Waveshaper, capacity_for,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");
    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("next_sample", block_size),
            &block_size,
            |b, &n| {
                let mut osc = Oscillator::new(SAMPLE_RATE, 5.0);
                b.iter(|| {
                    for _ in 0..n {
                        black_box(osc.next_sample());
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_delay_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("DelayLine");
    for interp in [Interpolation::Linear, Interpolation::Thiran] {
        for &block_size in BLOCK_SIZES {
            let input = generate_test_signal(block_size);
            group.bench_with_input(
                BenchmarkId::new(format!("push_pop_{interp:?}"), block_size),
                &block_size,
                |b, _| {
                    let mut line = DelayLine::new(interp);
                    line.prepare(1, capacity_for(SAMPLE_RATE, 0.1));
                    let mut lfo = Oscillator::new(SAMPLE_RATE, 2.0);
                    b.iter(|| {
                        for &x in &input {
                            line.push(0, x);
                            let d = (lfo.next_sample() * 0.03 + 0.03) * SAMPLE_RATE;
                            black_box(line.pop(0, d, true));
                        }
                    });
                },
            );
        }
    }

    group.bench_function("feedback_1024", |b| {
        let input = generate_test_signal(1024);
        let mut line = DelayLine::new(Interpolation::None);
        line.prepare(1, capacity_for(SAMPLE_RATE, 1.0));
        b.iter(|| {
            for &x in &input {
                black_box(line.feedback(0, x, 9600, 0.5));
            }
        });
    });
    group.finish();
}

fn bench_waveshaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("Waveshaper");
    let input = generate_test_signal(1024);
    let settings = ShaperSettings::default();
    for mode in DistortionMode::ALL {
        let shaper = Waveshaper::from_config(mode, &settings);
        group.bench_function(mode.name(), |b| {
            let mut block = input.clone();
            let mut rng = Lcg::default();
            b.iter(|| {
                block.copy_from_slice(&input);
                shaper.shape_block(black_box(&mut block), &mut rng);
            });
        });
    }
    group.finish();
}

fn bench_state_codec(c: &mut Criterion) {
    const PARAMS: &[ParamDescriptor] = &[
        ParamDescriptor::unit_interval("gain", "Gain", 0.5),
        ParamDescriptor::unit_interval("delay", "Delay", 0.2),
        ParamDescriptor::unit_interval("feedback", "Feedback", 0.2),
        ParamDescriptor::unit_interval("mix", "Mix", 0.5),
    ];
    let store = ParameterStore::new(PARAMS);
    c.bench_function("StateCodec/encode_decode", |b| {
        b.iter(|| {
            let bytes = StateCodec::encode(black_box(&store));
            StateCodec::decode(&bytes, &store);
        });
    });
}

criterion_group!(
    benches,
    bench_oscillator,
    bench_delay_line,
    bench_waveshaper,
    bench_state_codec
);
criterion_main!(benches);
