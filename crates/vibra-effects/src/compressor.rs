//! Compressor: parameter forwarding to a pluggable dynamics engine.
//!
//! # Signal Flow (built-in engine)
//!
//! ```text
//! Input → Envelope Follower → Gain Computer → Gain Reduction → Output
//! ```
//!
//! The kernel reads `(attack, release, threshold, ratio)` once per block and
//! passes them to a [`DynamicsEngine`]. [`PeakCompressor`] is a hard-knee
//! feed-forward compressor with one peak detector per channel.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use vibra_core::{
    EffectKernel, EnvelopeFollower, KernelFactory, KernelOptions, ParamDescriptor, ParamUnit,
    ParameterStore, ProcessSpec, db_to_linear, linear_to_db,
};

/// Attack time parameter index.
pub const ATTACK: usize = 0;
/// Release time parameter index.
pub const RELEASE: usize = 1;
/// Threshold parameter index.
pub const THRESHOLD: usize = 2;
/// Ratio parameter index.
pub const RATIO: usize = 3;

/// Values forwarded to a [`DynamicsEngine`] each block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    /// Attack time in ms.
    pub attack_ms: f32,
    /// Release time in ms.
    pub release_ms: f32,
    /// Threshold in dBFS.
    pub threshold_db: f32,
    /// Compression ratio (`n:1`).
    pub ratio: f32,
}

impl CompressorSettings {
    /// Reads the settings from a compressor parameter store.
    pub fn from_params(params: &ParameterStore) -> Self {
        Self {
            attack_ms: params.value(ATTACK),
            release_ms: params.value(RELEASE),
            threshold_db: params.value(THRESHOLD),
            ratio: params.value(RATIO),
        }
    }
}

/// The dynamics black box behind [`Compressor`].
pub trait DynamicsEngine: Send {
    /// Sizes internal state for the host configuration.
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Receives the current settings. Called once per block.
    fn set_settings(&mut self, settings: &CompressorSettings);

    /// Processes the block in place.
    fn process(&mut self, buffer: &mut [&mut [f32]]);

    /// Clears detector state.
    fn reset(&mut self);

    /// Frees what `prepare` allocated.
    fn release(&mut self) {}
}

/// Static hard-knee gain curve.
#[derive(Debug, Clone, Copy)]
struct GainComputer {
    threshold_db: f32,
    ratio: f32,
}

impl GainComputer {
    /// Gain reduction in dB (≥ 0) for a detector level in dB.
    #[inline]
    fn reduction_db(&self, input_db: f32) -> f32 {
        let overshoot = input_db - self.threshold_db;
        if overshoot <= 0.0 || self.ratio <= 1.0 {
            0.0
        } else {
            overshoot * (1.0 - 1.0 / self.ratio)
        }
    }
}

/// Feed-forward peak compressor.
#[derive(Debug, Clone)]
pub struct PeakCompressor {
    detectors: Vec<EnvelopeFollower>,
    computer: GainComputer,
    attack_ms: f32,
    release_ms: f32,
    sample_rate: f32,
}

impl Default for PeakCompressor {
    fn default() -> Self {
        Self {
            detectors: Vec::new(),
            computer: GainComputer {
                threshold_db: 0.0,
                ratio: 3.0,
            },
            attack_ms: 5.0,
            release_ms: 100.0,
            sample_rate: 48000.0,
        }
    }
}

impl PeakCompressor {
    /// Creates an unprepared engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gain reduction in dB the engine would apply to a steady level.
    pub fn static_reduction_db(&self, level_db: f32) -> f32 {
        self.computer.reduction_db(level_db)
    }
}

impl DynamicsEngine for PeakCompressor {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        let (attack, release) = (self.attack_ms, self.release_ms);
        self.detectors.clear();
        self.detectors.resize_with(spec.channels, || {
            EnvelopeFollower::with_times(spec.sample_rate, attack, release)
        });
    }

    fn set_settings(&mut self, settings: &CompressorSettings) {
        self.attack_ms = settings.attack_ms;
        self.release_ms = settings.release_ms;
        self.computer = GainComputer {
            threshold_db: settings.threshold_db,
            ratio: settings.ratio,
        };
        for detector in &mut self.detectors {
            detector.set_attack_ms(settings.attack_ms);
            detector.set_release_ms(settings.release_ms);
        }
    }

    fn process(&mut self, buffer: &mut [&mut [f32]]) {
        let computer = self.computer;
        for (channel, detector) in buffer.iter_mut().zip(self.detectors.iter_mut()) {
            for sample in channel.iter_mut() {
                let level_db = linear_to_db(detector.process(*sample));
                *sample *= db_to_linear(-computer.reduction_db(level_db));
            }
        }
    }

    fn reset(&mut self) {
        for detector in &mut self.detectors {
            detector.reset();
        }
    }

    fn release(&mut self) {
        self.detectors = Vec::new();
    }
}

/// Compressor kernel.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | attack | 0–30 ms | 5.0 |
/// | 1 | release | 50–300 ms | 100.0 |
/// | 2 | threshold | −50–5 dB | 0.0 |
/// | 3 | ratio | 1–20 | 3.0 |
#[derive(Debug, Clone)]
pub struct Compressor<E: DynamicsEngine = PeakCompressor> {
    engine: E,
}

impl<E: DynamicsEngine> Compressor<E> {
    /// Wraps a custom engine and prepares it.
    pub fn with_engine(engine: E, spec: &ProcessSpec, params: &ParameterStore) -> Self {
        let mut compressor = Self { engine };
        compressor.prepare(spec, params);
        compressor
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: DynamicsEngine + Default> KernelFactory for Compressor<E> {
    const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("attack", "Attack", ParamUnit::Milliseconds, 0.0, 30.0, 5.0),
        ParamDescriptor::new(
            "release",
            "Release",
            ParamUnit::Milliseconds,
            50.0,
            300.0,
            100.0,
        ),
        ParamDescriptor::new(
            "threshold",
            "Thresh",
            ParamUnit::Decibels,
            -50.0,
            5.0,
            0.0,
        ),
        ParamDescriptor::new("ratio", "Ratio", ParamUnit::Ratio, 1.0, 20.0, 3.0),
    ];

    fn create(spec: &ProcessSpec, _options: &KernelOptions, params: &ParameterStore) -> Self {
        Self::with_engine(E::default(), spec, params)
    }
}

impl<E: DynamicsEngine> EffectKernel for Compressor<E> {
    fn prepare(&mut self, spec: &ProcessSpec, params: &ParameterStore) {
        self.engine.set_settings(&CompressorSettings::from_params(params));
        self.engine.prepare(spec);
    }

    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore) {
        self.engine.set_settings(&CompressorSettings::from_params(params));
        self.engine.process(buffer);
    }

    fn reset(&mut self) {
        self.engine.reset();
    }

    fn release(&mut self) {
        self.engine.release();
    }

    fn tail_seconds(&self, params: &ParameterStore) -> f32 {
        params.value(RELEASE) / 1000.0
    }
}
