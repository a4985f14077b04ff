//! LFO-modulated delay choruses.
//!
//! Two wirings share the same primitives:
//!
//! - [`Chorus`]: three taps at ⅓, ⅔ and the full base delay, each swept by
//!   the channel's LFO and amplitude-modulated by `depth/n`, summed with
//!   weights ½, ⅓ and ⅙.
//! - [`ChorusAm`]: one tap swept between 0 and twice the base delay, scaled
//!   by `feedback` and amplitude-modulated by `depth/5`.
//!
//! In both, the tap delay for fraction `f` of base delay `D` seconds is
//! `(lfo·f·D + f·D)·sample_rate`, so the line must hold `2·D`.

use vibra_core::{
    DelayLine, EffectKernel, KernelFactory, KernelOptions, ModulationPolarity, OscillatorBank,
    ParamDescriptor, ParamUnit, ParameterStore, ProcessSpec, capacity_for, wet_dry_mix,
};

/// Output gain parameter index.
pub const GAIN: usize = 0;
/// LFO rate parameter index.
pub const RATE: usize = 1;
/// Modulation depth parameter index.
pub const DEPTH: usize = 2;
/// Base delay parameter index.
pub const DELAY: usize = 3;
/// Wet/dry mix parameter index for [`Chorus`].
pub const MIX: usize = 4;
/// Tap scaling parameter index for [`ChorusAm`].
pub const AM_FEEDBACK: usize = 4;
/// Wet/dry mix parameter index for [`ChorusAm`].
pub const AM_MIX: usize = 5;

/// Longest base delay of [`Chorus`] in seconds.
pub const MAX_DELAY_SECONDS: f32 = 0.1;
/// Longest base delay of [`ChorusAm`] in seconds.
pub const AM_MAX_DELAY_SECONDS: f32 = 1.0;

/// Divisor applied to depth for the [`ChorusAm`] amplitude modulation.
const AM_DEPTH_DIVISOR: f32 = 5.0;

struct Voice {
    /// Fraction of the base delay.
    fraction: f32,
    /// Amplitude-modulation depth is `depth / depth_divisor`.
    depth_divisor: f32,
    /// Share of the wet sum.
    weight: f32,
}

const VOICES: [Voice; 3] = [
    Voice {
        fraction: 1.0 / 3.0,
        depth_divisor: 1.0,
        weight: 1.0 / 2.0,
    },
    Voice {
        fraction: 2.0 / 3.0,
        depth_divisor: 2.0,
        weight: 1.0 / 3.0,
    },
    Voice {
        fraction: 1.0,
        depth_divisor: 3.0,
        weight: 1.0 / 6.0,
    },
];

/// Three-voice chorus.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | gain | 0–1 | 0.5 |
/// | 1 | rate | 0–10 Hz | 5.0 |
/// | 2 | depth | 0–1 | 0.5 |
/// | 3 | delay | 0.01–0.1 s | 0.03 |
/// | 4 | mix | 0–1 | 0.5 |
///
/// The three voices read one ring per channel, each through its own tap so
/// the Thiran interpolator state of one voice never leaks into another.
#[derive(Debug, Clone)]
pub struct Chorus {
    line: DelayLine,
    lfos: OscillatorBank,
    sample_rate: f32,
    options: KernelOptions,
}

impl KernelFactory for Chorus {
    const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::unit_interval("gain", "Gain", 0.5),
        ParamDescriptor::new("rate", "Rate", ParamUnit::Hertz, 0.0, 10.0, 5.0),
        ParamDescriptor::unit_interval("depth", "Depth", 0.5),
        ParamDescriptor::new(
            "delay",
            "Delay",
            ParamUnit::Seconds,
            0.01,
            MAX_DELAY_SECONDS,
            0.03,
        )
        .with_step(0.001),
        ParamDescriptor::unit_interval("mix", "Mix", 0.5),
    ];

    fn create(spec: &ProcessSpec, options: &KernelOptions, params: &ParameterStore) -> Self {
        let mut chorus = Self {
            line: DelayLine::new(options.interpolation),
            lfos: OscillatorBank::with_routing(options.lfo_routing),
            sample_rate: spec.sample_rate,
            options: *options,
        };
        chorus.prepare(spec, params);
        chorus
    }
}

impl EffectKernel for Chorus {
    fn prepare(&mut self, spec: &ProcessSpec, params: &ParameterStore) {
        self.sample_rate = spec.sample_rate;
        self.line.prepare_taps(
            spec.channels,
            capacity_for(spec.sample_rate, MAX_DELAY_SECONDS),
            VOICES.len(),
        );
        self.lfos.prepare(
            spec.channels,
            spec.sample_rate,
            params.value(RATE),
            self.options.reset_phase_on_prepare,
        );
    }

    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore) {
        let gain = params.value(GAIN);
        let depth = params.value(DEPTH);
        let delay = params.value(DELAY);
        let mix = params.value(MIX);
        let sr = self.sample_rate;
        self.lfos.set_frequency(params.value(RATE));

        let line = &mut self.line;
        for (ch, (channel, lfo)) in buffer
            .iter_mut()
            .zip(self.lfos.oscillators_mut().iter_mut())
            .enumerate()
        {
            for sample in channel.iter_mut() {
                let dry = *sample;
                let lfo = lfo.next_sample();
                line.push(ch, dry);
                let mut wet = 0.0;
                for (v, voice) in VOICES.iter().enumerate() {
                    let base = voice.fraction * delay;
                    let tap = line.pop_tap(ch, v, (lfo * base + base) * sr, true);
                    let am = ModulationPolarity::Bipolar.apply(lfo, depth / voice.depth_divisor);
                    wet += tap * am * voice.weight;
                }
                *sample = wet_dry_mix(dry, wet, mix) * gain;
            }
        }
    }

    fn reset(&mut self) {
        self.line.clear();
    }

    fn release(&mut self) {
        self.line.release();
        self.lfos.release();
    }

    fn tail_seconds(&self, params: &ParameterStore) -> f32 {
        2.0 * params.value(DELAY)
    }
}

/// Single-voice chorus with tap scaling and gentle amplitude modulation.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | gain | 0–1 | 0.5 |
/// | 1 | rate | 0–10 Hz | 5.0 |
/// | 2 | depth | 0–1 | 0.5 |
/// | 3 | delay | 0–1 s | 0.2 |
/// | 4 | feedback | 0–1 | 0.2 |
/// | 5 | mix | 0–1 | 0.5 |
///
/// `feedback` scales the tap; the line itself is open-loop.
#[derive(Debug, Clone)]
pub struct ChorusAm {
    line: DelayLine,
    lfos: OscillatorBank,
    sample_rate: f32,
    options: KernelOptions,
}

impl KernelFactory for ChorusAm {
    const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::unit_interval("gain", "Gain", 0.5),
        ParamDescriptor::new("rate", "Rate", ParamUnit::Hertz, 0.0, 10.0, 5.0),
        ParamDescriptor::unit_interval("depth", "Depth", 0.5),
        ParamDescriptor::new(
            "delay",
            "Delay",
            ParamUnit::Seconds,
            0.0,
            AM_MAX_DELAY_SECONDS,
            0.2,
        ),
        ParamDescriptor::unit_interval("feedback", "Feedback", 0.2),
        ParamDescriptor::unit_interval("mix", "Mix", 0.5),
    ];

    fn create(spec: &ProcessSpec, options: &KernelOptions, params: &ParameterStore) -> Self {
        let mut chorus = Self {
            line: DelayLine::new(options.interpolation),
            lfos: OscillatorBank::with_routing(options.lfo_routing),
            sample_rate: spec.sample_rate,
            options: *options,
        };
        chorus.prepare(spec, params);
        chorus
    }
}

impl EffectKernel for ChorusAm {
    fn prepare(&mut self, spec: &ProcessSpec, params: &ParameterStore) {
        self.sample_rate = spec.sample_rate;
        self.line.prepare(
            spec.channels,
            capacity_for(spec.sample_rate, AM_MAX_DELAY_SECONDS),
        );
        self.lfos.prepare(
            spec.channels,
            spec.sample_rate,
            params.value(RATE),
            self.options.reset_phase_on_prepare,
        );
    }

    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore) {
        let gain = params.value(GAIN);
        let depth = params.value(DEPTH) / AM_DEPTH_DIVISOR;
        let delay = params.value(DELAY);
        let feedback = params.value(AM_FEEDBACK);
        let mix = params.value(AM_MIX);
        let sr = self.sample_rate;
        self.lfos.set_frequency(params.value(RATE));

        let line = &mut self.line;
        for (ch, (channel, lfo)) in buffer
            .iter_mut()
            .zip(self.lfos.oscillators_mut().iter_mut())
            .enumerate()
        {
            for sample in channel.iter_mut() {
                let dry = *sample;
                let lfo = lfo.next_sample();
                line.push(ch, dry);
                let tap = line.pop(ch, (lfo * delay + delay) * sr, true);
                let wet = tap * feedback * ModulationPolarity::Bipolar.apply(lfo, depth);
                *sample = wet_dry_mix(dry, wet, mix) * gain;
            }
        }
    }

    fn reset(&mut self) {
        self.line.clear();
    }

    fn release(&mut self) {
        self.line.release();
        self.lfos.release();
    }

    fn tail_seconds(&self, params: &ParameterStore) -> f32 {
        2.0 * params.value(DELAY)
    }
}
