//! Phaser: parameter forwarding to a pluggable all-pass engine.
//!
//! The kernel's job is to read `(rate, depth, centre, feedback, mix)` once
//! per block and hand them to a [`PhaserEngine`]. [`AllpassPhaser`] is the
//! built-in engine; hosts with their own filter bank implement the trait.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use libm::{log10f, powf};
use vibra_core::{
    EffectKernel, FirstOrderAllpass, KernelFactory, KernelOptions, OscillatorBank,
    ParamDescriptor, ParamUnit, ParameterStore, ProcessSpec, flush_denormal, wet_dry_mix,
};

/// LFO rate parameter index.
pub const RATE: usize = 0;
/// Sweep depth parameter index.
pub const DEPTH: usize = 1;
/// Centre frequency parameter index.
pub const CENTRE: usize = 2;
/// Feedback parameter index.
pub const FEEDBACK: usize = 3;
/// Wet/dry mix parameter index.
pub const MIX: usize = 4;

/// Values forwarded to a [`PhaserEngine`] each block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaserSettings {
    /// Sweep rate in Hz.
    pub rate: f32,
    /// Sweep depth, 0–1.
    pub depth: f32,
    /// Centre frequency in Hz.
    pub centre: f32,
    /// Feedback, −1–1.
    pub feedback: f32,
    /// Wet/dry mix, 0–1.
    pub mix: f32,
}

impl PhaserSettings {
    /// Reads the settings from a phaser parameter store.
    pub fn from_params(params: &ParameterStore) -> Self {
        Self {
            rate: params.value(RATE),
            depth: params.value(DEPTH),
            centre: params.value(CENTRE),
            feedback: params.value(FEEDBACK),
            mix: params.value(MIX),
        }
    }
}

/// The filtering black box behind [`Phaser`].
pub trait PhaserEngine: Send {
    /// Sizes internal state for the host configuration.
    fn prepare(&mut self, spec: &ProcessSpec, reset_phase: bool);

    /// Receives the current settings. Called once per block, before
    /// [`process`](Self::process).
    fn set_settings(&mut self, settings: &PhaserSettings);

    /// Filters the block in place.
    fn process(&mut self, buffer: &mut [&mut [f32]]);

    /// Clears filter memories.
    fn reset(&mut self);

    /// Frees what `prepare` allocated.
    fn release(&mut self) {}
}

/// Number of cascaded all-pass sections.
pub const STAGES: usize = 6;

/// Lowest frequency of the sweep.
const SWEEP_MIN_HZ: f32 = 20.0;

/// Highest frequency of the sweep, further limited to `0.49·fs`.
const SWEEP_MAX_HZ: f32 = 20_000.0;

/// Largest feedback magnitude the loop is run with.
const MAX_FEEDBACK: f32 = 0.95;

/// Samples between all-pass coefficient updates.
const COEFF_UPDATE_INTERVAL: u32 = 4;

#[derive(Debug, Clone, Copy, Default)]
struct PhaserChannel {
    stages: [FirstOrderAllpass; STAGES],
    last_output: f32,
}

/// Six-stage first-order all-pass phaser.
///
/// The LFO sweeps the stage frequencies on a log scale between 20 Hz and
/// `min(20 kHz, 0.49·fs)`, centred on the `centre` frequency with a swing
/// of `depth/2` of that range.
#[derive(Debug, Clone, Default)]
pub struct AllpassPhaser {
    channels: Vec<PhaserChannel>,
    lfos: OscillatorBank,
    settings: Option<PhaserSettings>,
    sample_rate: f32,
    update_counter: u32,
}

impl AllpassPhaser {
    /// Creates an unprepared engine.
    pub fn new() -> Self {
        Self::default()
    }

    fn sweep_max(&self) -> f32 {
        SWEEP_MAX_HZ.min(0.49 * self.sample_rate)
    }
}

impl PhaserEngine for AllpassPhaser {
    fn prepare(&mut self, spec: &ProcessSpec, reset_phase: bool) {
        self.sample_rate = spec.sample_rate;
        self.channels.clear();
        self.channels.resize(spec.channels, PhaserChannel::default());
        let rate = self.settings.map_or(0.0, |s| s.rate);
        self.lfos.prepare(spec.channels, spec.sample_rate, rate, reset_phase);
        self.update_counter = 0;
    }

    fn set_settings(&mut self, settings: &PhaserSettings) {
        self.lfos.set_frequency(settings.rate);
        self.settings = Some(*settings);
    }

    fn process(&mut self, buffer: &mut [&mut [f32]]) {
        let Some(settings) = self.settings else {
            return;
        };
        let sr = self.sample_rate;
        let sweep_min = SWEEP_MIN_HZ;
        let sweep_max = self.sweep_max();
        let log_range = log10f(sweep_max / sweep_min);
        let centre = if log_range > 0.0 {
            (log10f(settings.centre.max(sweep_min) / sweep_min) / log_range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let swing = 0.5 * settings.depth;
        let feedback = settings.feedback.clamp(-MAX_FEEDBACK, MAX_FEEDBACK);

        let start_counter = self.update_counter;
        let mut end_counter = start_counter;
        for ((channel, state), lfo) in buffer
            .iter_mut()
            .zip(self.channels.iter_mut())
            .zip(self.lfos.oscillators_mut().iter_mut())
        {
            let mut counter = start_counter;
            for sample in channel.iter_mut() {
                let modulation = lfo.next_sample();
                if counter == 0 {
                    let position = (centre + swing * modulation).clamp(0.0, 1.0);
                    let frequency = sweep_min * powf(sweep_max / sweep_min, position);
                    for stage in &mut state.stages {
                        stage.set_frequency(frequency, sr);
                    }
                    counter = COEFF_UPDATE_INTERVAL;
                }
                counter -= 1;

                let dry = *sample;
                let mut wet = dry + feedback * state.last_output;
                for stage in &mut state.stages {
                    wet = stage.process(wet);
                }
                state.last_output = flush_denormal(wet);
                *sample = wet_dry_mix(dry, wet, settings.mix);
            }
            end_counter = counter;
        }
        self.update_counter = end_counter;
    }

    fn reset(&mut self) {
        for channel in &mut self.channels {
            *channel = PhaserChannel::default();
        }
        self.update_counter = 0;
    }

    fn release(&mut self) {
        self.channels = Vec::new();
        self.lfos.release();
    }
}

/// Phaser kernel.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | rate | 0–100 Hz | 50.0 |
/// | 1 | depth | 0–1 | 0.5 |
/// | 2 | centre | 1–100 Hz | 50.0 |
/// | 3 | feedback | −1–1 | 0.5 |
/// | 4 | mix | 0–1 | 0.5 |
#[derive(Debug, Clone)]
pub struct Phaser<E: PhaserEngine = AllpassPhaser> {
    engine: E,
    options: KernelOptions,
}

impl<E: PhaserEngine> Phaser<E> {
    /// Wraps a custom engine and prepares it.
    pub fn with_engine(
        engine: E,
        spec: &ProcessSpec,
        options: &KernelOptions,
        params: &ParameterStore,
    ) -> Self {
        let mut phaser = Self {
            engine,
            options: *options,
        };
        phaser.prepare(spec, params);
        phaser
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: PhaserEngine + Default> KernelFactory for Phaser<E> {
    const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("rate", "Rate", ParamUnit::Hertz, 0.0, 100.0, 50.0),
        ParamDescriptor::unit_interval("depth", "Depth", 0.5),
        ParamDescriptor::new("centre", "Centre", ParamUnit::Hertz, 1.0, 100.0, 50.0),
        ParamDescriptor::new("feedback", "Feedback", ParamUnit::None, -1.0, 1.0, 0.5),
        ParamDescriptor::unit_interval("mix", "Mix", 0.5),
    ];

    fn create(spec: &ProcessSpec, options: &KernelOptions, params: &ParameterStore) -> Self {
        Self::with_engine(E::default(), spec, options, params)
    }
}

impl<E: PhaserEngine> EffectKernel for Phaser<E> {
    fn prepare(&mut self, spec: &ProcessSpec, params: &ParameterStore) {
        self.engine.set_settings(&PhaserSettings::from_params(params));
        self.engine.prepare(spec, self.options.reset_phase_on_prepare);
    }

    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore) {
        self.engine.set_settings(&PhaserSettings::from_params(params));
        self.engine.process(buffer);
    }

    fn reset(&mut self) {
        self.engine.reset();
    }

    fn release(&mut self) {
        self.engine.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        seen: Vec<PhaserSettings>,
        processed_blocks: usize,
    }

    impl PhaserEngine for Recording {
        fn prepare(&mut self, _spec: &ProcessSpec, _reset_phase: bool) {}
        fn set_settings(&mut self, settings: &PhaserSettings) {
            self.seen.push(*settings);
        }
        fn process(&mut self, _buffer: &mut [&mut [f32]]) {
            self.processed_blocks += 1;
        }
        fn reset(&mut self) {}
    }

    #[test]
    fn test_forwards_once_per_block() {
        let params = ParameterStore::new(Phaser::<Recording>::PARAMS);
        let mut phaser = Phaser::<Recording>::create(
            &ProcessSpec::default(),
            &KernelOptions::default(),
            &params,
        );
        params.set("rate", 3.0);
        params.set("feedback", -0.25);
        let mut block = [0.0f32; 64];
        phaser.process(&mut [&mut block], &params);
        phaser.process(&mut [&mut block], &params);

        let engine = phaser.engine();
        assert_eq!(engine.processed_blocks, 2);
        // One from prepare, one per block.
        assert_eq!(engine.seen.len(), 3);
        let last = engine.seen[2];
        assert_eq!(last.rate, 3.0);
        assert_eq!(last.feedback, -0.25);
        assert_eq!(last.centre, 50.0);
    }

    #[test]
    fn test_dry_mix_is_identity() {
        let params = ParameterStore::new(Phaser::<AllpassPhaser>::PARAMS);
        params.set("mix", 0.0);
        let mut phaser = Phaser::<AllpassPhaser>::create(
            &ProcessSpec::new(48000.0, 256, 2),
            &KernelOptions::default(),
            &params,
        );
        let input: Vec<f32> = (0..256).map(|n| (n as f32 * 0.1).sin() * 0.5).collect();
        let mut left = input.clone();
        let mut right = input.clone();
        phaser.process(&mut [&mut left, &mut right], &params);
        assert_eq!(left, input);
        assert_eq!(right, input);
    }

    #[test]
    fn test_stable_at_extremes() {
        let params = ParameterStore::new(Phaser::<AllpassPhaser>::PARAMS);
        params.set("feedback", 1.0);
        params.set("depth", 1.0);
        params.set("rate", 100.0);
        params.set("mix", 1.0);
        let mut phaser = Phaser::<AllpassPhaser>::create(
            &ProcessSpec::new(44100.0, 512, 1),
            &KernelOptions::default(),
            &params,
        );
        for _ in 0..50 {
            let mut block: Vec<f32> = (0..512)
                .map(|n| if n % 64 == 0 { 1.0 } else { 0.0 })
                .collect();
            phaser.process(&mut [&mut block], &params);
            assert!(block.iter().all(|s| s.is_finite() && s.abs() < 100.0));
        }
    }

    #[test]
    fn test_wet_differs_from_dry() {
        let params = ParameterStore::new(Phaser::<AllpassPhaser>::PARAMS);
        params.set("mix", 1.0);
        params.set("centre", 100.0);
        let mut phaser = Phaser::<AllpassPhaser>::create(
            &ProcessSpec::new(48000.0, 256, 1),
            &KernelOptions::default(),
            &params,
        );
        let input: Vec<f32> = (0..256).map(|n| (n as f32 * 0.05).sin()).collect();
        let mut block = input.clone();
        phaser.process(&mut [&mut block], &params);
        let diff: f32 = block.iter().zip(&input).map(|(a, b)| (a - b).abs()).sum();
        assert!(diff > 1.0, "all-pass cascade should shift phase");
    }

    #[test]
    fn test_release_passes_through() {
        let params = ParameterStore::new(Phaser::<AllpassPhaser>::PARAMS);
        let mut phaser = Phaser::<AllpassPhaser>::create(
            &ProcessSpec::default(),
            &KernelOptions::default(),
            &params,
        );
        phaser.release();
        let mut block = [0.5f32; 16];
        phaser.process(&mut [&mut block], &params);
        assert!(block.iter().all(|&s| s == 0.5));
    }
}
