//! Feedback delay (comb filter).
//!
//! Each sample reads the slot written `delay · sample_rate` samples ago,
//! scales it by `feedback` to form the wet signal, and writes `dry + wet`
//! back so repeats recirculate:
//!
//! ```text
//! wet[n]  = feedback · line[n − D]
//! line[n] = dry[n] + wet[n]
//! out[n]  = (dry[n]·(1 − mix) + wet[n]·mix) · gain
//! ```

use libm::{log10f, roundf};
use vibra_core::{
    DelayLine, EffectKernel, Interpolation, KernelFactory, KernelOptions, ParamDescriptor,
    ParamUnit, ParameterStore, ProcessSpec, capacity_for, wet_dry_mix,
};

/// Output gain parameter index.
pub const GAIN: usize = 0;
/// Delay time parameter index.
pub const DELAY: usize = 1;
/// Feedback parameter index.
pub const FEEDBACK: usize = 2;
/// Wet/dry mix parameter index.
pub const MIX: usize = 3;

/// Longest addressable delay in seconds.
pub const MAX_DELAY_SECONDS: f32 = 1.0;

/// Tail reports are capped here for feedback close to 1.
const MAX_TAIL_SECONDS: f32 = 60.0;

/// Feedback delay kernel.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | gain | 0–1 | 0.5 |
/// | 1 | delay | 0–1 s | 0.2 |
/// | 2 | feedback | 0–1 | 0.2 |
/// | 3 | mix | 0–1 | 0.5 |
///
/// The delay time is read once per block and rounded to whole samples.
#[derive(Debug, Clone)]
pub struct Delay {
    line: DelayLine,
    sample_rate: f32,
}

impl Delay {
    /// Delay in whole samples for the current parameter value.
    fn delay_samples(&self, params: &ParameterStore) -> usize {
        roundf(params.value(DELAY) * self.sample_rate) as usize
    }
}

impl KernelFactory for Delay {
    const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::unit_interval("gain", "Gain", 0.5),
        ParamDescriptor::new(
            "delay",
            "Delay",
            ParamUnit::Seconds,
            0.0,
            MAX_DELAY_SECONDS,
            0.2,
        ),
        ParamDescriptor::unit_interval("feedback", "Feedback", 0.2),
        ParamDescriptor::unit_interval("mix", "Mix", 0.5),
    ];

    fn create(spec: &ProcessSpec, _options: &KernelOptions, params: &ParameterStore) -> Self {
        let mut delay = Self {
            line: DelayLine::new(Interpolation::None),
            sample_rate: spec.sample_rate,
        };
        delay.prepare(spec, params);
        delay
    }
}

impl EffectKernel for Delay {
    fn prepare(&mut self, spec: &ProcessSpec, _params: &ParameterStore) {
        self.sample_rate = spec.sample_rate;
        self.line
            .prepare(spec.channels, capacity_for(spec.sample_rate, MAX_DELAY_SECONDS));
    }

    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore) {
        let gain = params.value(GAIN);
        let feedback = params.value(FEEDBACK);
        let mix = params.value(MIX);
        let delay = self.delay_samples(params);

        let channels = self.line.channels();
        for (ch, channel) in buffer.iter_mut().take(channels).enumerate() {
            for sample in channel.iter_mut() {
                let dry = *sample;
                let wet = self.line.feedback(ch, dry, delay, feedback);
                *sample = wet_dry_mix(dry, wet, mix) * gain;
            }
        }
    }

    fn reset(&mut self) {
        self.line.clear();
    }

    fn release(&mut self) {
        self.line.release();
    }

    /// Time for the repeats to decay by 60 dB.
    fn tail_seconds(&self, params: &ParameterStore) -> f32 {
        let delay = params.value(DELAY);
        let feedback = params.value(FEEDBACK);
        if feedback <= 0.0 {
            return delay;
        }
        if feedback >= 1.0 {
            return MAX_TAIL_SECONDS;
        }
        (delay * -3.0 / log10f(feedback)).min(MAX_TAIL_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(sample_rate: f32, channels: usize) -> (Delay, ParameterStore) {
        let params = ParameterStore::new(Delay::PARAMS);
        let kernel = Delay::create(
            &ProcessSpec::new(sample_rate, 512, channels),
            &KernelOptions::default(),
            &params,
        );
        (kernel, params)
    }

    #[test]
    fn test_impulse_repeats() {
        let (mut kernel, params) = delay(1000.0, 1);
        params.set("delay", 0.01);
        params.set("feedback", 0.5);
        params.set("mix", 1.0);
        params.set("gain", 1.0);

        let mut block = [0.0f32; 40];
        block[0] = 1.0;
        kernel.process(&mut [&mut block], &params);

        for (n, &s) in block.iter().enumerate() {
            let expected = match n {
                10 => 0.5,
                20 => 0.25,
                30 => 0.125,
                _ => 0.0,
            };
            assert!((s - expected).abs() < 1e-6, "n={n}: {s} != {expected}");
        }
    }

    #[test]
    fn test_dry_path_scaled() {
        let (mut kernel, params) = delay(48000.0, 2);
        params.set("gain", 0.8);
        params.set("mix", 0.25);
        let mut left = [1.0f32; 8];
        let mut right = [-1.0f32; 8];
        kernel.process(&mut [&mut left, &mut right], &params);
        assert!(left.iter().all(|&s| (s - 0.6).abs() < 1e-6));
        assert!(right.iter().all(|&s| (s + 0.6).abs() < 1e-6));
    }

    #[test]
    fn test_repeats_span_blocks() {
        let (mut kernel, params) = delay(1000.0, 1);
        params.set("delay", 0.05);
        params.set("feedback", 1.0);
        params.set("mix", 1.0);
        params.set("gain", 1.0);

        let mut first = [0.0f32; 32];
        first[0] = 1.0;
        kernel.process(&mut [&mut first], &params);
        let mut second = [0.0f32; 32];
        kernel.process(&mut [&mut second], &params);
        assert_eq!(second[50 - 32], 1.0);
    }

    #[test]
    fn test_zero_delay_clamped_to_one_sample() {
        let (mut kernel, params) = delay(1000.0, 1);
        params.set("delay", 0.0);
        params.set("feedback", 1.0);
        params.set("mix", 1.0);
        params.set("gain", 1.0);
        let mut block = [1.0, 0.0, 0.0];
        kernel.process(&mut [&mut block], &params);
        assert_eq!(block, [0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_reset_clears_tail() {
        let (mut kernel, params) = delay(1000.0, 1);
        params.set("delay", 0.01);
        params.set("mix", 1.0);
        let mut block = [1.0f32; 20];
        kernel.process(&mut [&mut block], &params);
        kernel.reset();
        let mut silence = [0.0f32; 20];
        kernel.process(&mut [&mut silence], &params);
        assert!(silence.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_tail_seconds() {
        let (kernel, params) = delay(48000.0, 2);
        params.set("delay", 0.5);
        params.set("feedback", 0.1);
        assert!((kernel.tail_seconds(&params) - 1.5).abs() < 1e-4);
        params.set("feedback", 0.0);
        assert_eq!(kernel.tail_seconds(&params), 0.5);
        params.set("feedback", 1.0);
        assert_eq!(kernel.tail_seconds(&params), MAX_TAIL_SECONDS);
    }

    #[test]
    fn test_release_passes_through() {
        let (mut kernel, params) = delay(48000.0, 1);
        kernel.release();
        let mut block = [0.3f32; 4];
        kernel.process(&mut [&mut block], &params);
        assert_eq!(block, [0.3; 4]);
    }
}
