//! Property-based tests for vibra-core primitives.
//!
//! Covers delay-line addressing, oscillator periodicity, waveshaper bounds,
//! parameter clamping and the state codec round-trip law.

use proptest::prelude::*;
use vibra_core::waveshaper::{arctan_soft_clip, cubic_soft_clip, hard_clip, wavefold};
use vibra_core::{
    DelayLine, Interpolation, Oscillator, ParamDescriptor, ParamUnit, ParameterStore, StateCodec,
};

const CAPACITY: usize = 256;

const PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor::unit_interval("gain", "Gain", 0.5),
    ParamDescriptor::new("rate", "Rate", ParamUnit::Hertz, 0.0, 20.0, 5.0),
    ParamDescriptor::new("threshold", "Thresh", ParamUnit::Decibels, -50.0, 5.0, 0.0),
    ParamDescriptor::stepped("bits", "Bits", ParamUnit::Bits, 1.0, 16.0, 8.0),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A sample pushed at time t and popped with integer delay d at time t+d
    /// comes back unchanged, for every interpolation mode.
    #[test]
    fn delay_integer_roundtrip(
        d in 0usize..CAPACITY,
        value in -1.0f32..=1.0f32,
        mode in 0usize..3,
    ) {
        let interp = [Interpolation::None, Interpolation::Linear, Interpolation::Thiran][mode];
        let mut line = DelayLine::new(interp);
        line.prepare(1, CAPACITY);
        line.push(0, value);
        for _ in 0..d {
            line.push(0, 0.0);
        }
        let out = line.pop(0, d as f32, true);
        prop_assert_eq!(out, value, "mode {:?}, d = {}", interp, d);
    }

    /// Linear fractional reads stay between the two neighbouring taps.
    #[test]
    fn delay_linear_between_taps(
        d in 0.0f32..(CAPACITY as f32 - 2.0),
        samples in prop::collection::vec(-1.0f32..=1.0f32, CAPACITY),
    ) {
        let mut line = DelayLine::new(Interpolation::Linear);
        line.prepare(1, CAPACITY);
        for &s in &samples {
            line.push(0, s);
        }
        let n = samples.len() - 1;
        let i = d as usize;
        let newer = samples[n - i];
        let older = samples[n - i - 1];
        let out = line.pop(0, d, true);
        let (lo, hi) = if newer < older { (newer, older) } else { (older, newer) };
        prop_assert!(out >= lo - 1e-6 && out <= hi + 1e-6,
            "d={} out={} not in [{}, {}]", d, out, lo, hi);
    }

    /// After round(sr/f) samples the oscillator is back near its start phase.
    #[test]
    fn oscillator_periodic(freq in 1.0f32..200.0f32) {
        let sr = 48000.0;
        let mut osc = Oscillator::new(sr, freq);
        let period = (sr / freq).round() as usize;
        let start = osc.next_sample();
        for _ in 1..period {
            osc.next_sample();
        }
        let again = osc.next_sample();
        // One period of rounding error is at most half a sample of phase.
        let tolerance = core::f32::consts::PI * freq / sr + 1e-3;
        prop_assert!((again - start).abs() <= tolerance,
            "freq={} start={} again={}", freq, start, again);
        prop_assert!(osc.phase() >= 0.0 && osc.phase() < core::f32::consts::TAU);
    }

    /// Soft clips never exceed their ceiling; wavefold and hard clip never
    /// exceed their threshold.
    #[test]
    fn waveshapers_bounded(
        x in -100.0f32..100.0f32,
        k in 0.0f32..50.0f32,
        a in 0.01f32..1.0f32,
        t in 0.01f32..2.0f32,
    ) {
        prop_assert!(arctan_soft_clip(x, k).abs() <= 1.0);
        let knee = 1.0 / (3.0 * a).sqrt();
        prop_assert!(cubic_soft_clip(x, a).abs() <= 2.0 / 3.0 * knee + 1e-4);
        prop_assert!(wavefold(x, t).abs() <= t + 1e-5);
        prop_assert!(hard_clip(x, t).abs() <= t);
    }

    /// Threshold-at-infinity and zero coefficient reduce to identity.
    #[test]
    fn waveshapers_identity_limits(x in -10.0f32..10.0f32) {
        prop_assert_eq!(wavefold(x, f32::INFINITY), x);
        prop_assert_eq!(hard_clip(x, f32::INFINITY), x);
        prop_assert_eq!(cubic_soft_clip(x, 0.0), x);
    }

    /// Every write lands inside the declared range.
    #[test]
    fn store_set_always_clamped(index in 0usize..4, value in proptest::num::f32::ANY) {
        let store = ParameterStore::new(PARAMS);
        store.set_value(index, value);
        let desc = PARAMS[index];
        let stored = store.value(index);
        prop_assert!(stored >= desc.min && stored <= desc.max,
            "{} stored {} from {}", desc.name, stored, value);
    }

    /// decode(encode(store)) == store for any valid assignment.
    #[test]
    fn state_roundtrip(
        gain in 0.0f32..=1.0f32,
        rate in 0.0f32..=20.0f32,
        threshold in -50.0f32..=5.0f32,
        bits in 1u8..=16u8,
    ) {
        let a = ParameterStore::new(PARAMS);
        a.set("gain", gain);
        a.set("rate", rate);
        a.set("threshold", threshold);
        a.set("bits", f32::from(bits));

        let b = ParameterStore::new(PARAMS);
        StateCodec::decode(&StateCodec::encode(&a), &b);
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}
