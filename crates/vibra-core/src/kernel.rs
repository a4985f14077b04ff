//! The effect kernel contract and its lifecycle types.
//!
//! A kernel is the per-effect wiring of oscillators, delay lines and
//! waveshapers. Its lifecycle is:
//!
//! 1. [`KernelFactory::create`] builds a kernel that is already prepared for
//!    a [`ProcessSpec`]. There is no unprepared kernel value, so `process`
//!    can never run against unsized buffers.
//! 2. [`EffectKernel::process`] runs once per host block on the audio thread.
//!    It reads parameters from the shared [`ParameterStore`], never
//!    allocates and never blocks.
//! 3. [`EffectKernel::prepare`] re-sizes an existing kernel when the host
//!    changes sample rate, block size or channel count. It may allocate.
//! 4. [`EffectKernel::release`] drops large buffers when the host stops.
//!
//! ## Design Decisions
//!
//! - **Object-safe core**: [`EffectKernel`] is object-safe so the registry
//!   can hand out `Box<dyn EffectKernel>`. Construction and the parameter
//!   table live on the separate [`KernelFactory`] trait.
//! - **Channel zipping**: kernels zip the host's channel slices with their
//!   own per-channel state. Channels beyond those prepared pass through
//!   untouched.

use crate::delay::Interpolation;
use crate::param::ParamDescriptor;
use crate::store::ParameterStore;

/// Host processing configuration passed to `prepare`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block the host will pass to `process`.
    pub max_block_size: usize,
    /// Number of channels.
    pub channels: usize,
}

impl ProcessSpec {
    /// Creates a spec.
    pub const fn new(sample_rate: f32, max_block_size: usize, channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channels,
        }
    }

    /// Stereo spec at the given sample rate with a 512-sample block.
    pub const fn stereo(sample_rate: f32) -> Self {
        Self::new(sample_rate, 512, 2)
    }

    /// Returns `true` if the spec can be prepared (positive finite sample
    /// rate, at least one channel).
    pub fn is_valid(&self) -> bool {
        self.sample_rate.is_finite() && self.sample_rate > 0.0 && self.channels > 0
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::stereo(48000.0)
    }
}

/// How an effect with one modulator per channel phases its LFOs.
///
/// Honoured by the tremolo and both choruses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoRouting {
    /// Every channel sees the same LFO value: identical input stays
    /// identical across channels.
    Shared,
    /// Each channel runs its own oscillator at the same rate, channel `k` of
    /// `n` offset by `2π·k/n` for stereo width.
    #[default]
    PerChannel,
}

/// How a bipolar LFO value is mapped onto an amplitude multiplier.
///
/// Only [`Unipolar`](Self::Unipolar) silences the trough: at `depth = 1`
/// and `lfo = −1` it yields 0. [`Bipolar`](Self::Bipolar) yields −1 there,
/// a full-level phase-inverted sample, and reaches 0 at `lfo = −1` only for
/// `depth = 0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModulationPolarity {
    /// `depth·lfo + 1 − depth`; swings below zero (phase inversion) when
    /// `depth > 0.5`. The trough multiplier at full depth is −1.
    #[default]
    Bipolar,
    /// `depth·(lfo + 1)/2 + 1 − depth`; stays within `[1 − depth, 1]`. The
    /// trough multiplier at full depth is 0.
    Unipolar,
}

impl ModulationPolarity {
    /// Amplitude multiplier for one LFO value.
    #[inline]
    pub fn apply(self, lfo: f32, depth: f32) -> f32 {
        match self {
            Self::Bipolar => depth * lfo + (1.0 - depth),
            Self::Unipolar => depth * (lfo + 1.0) * 0.5 + (1.0 - depth),
        }
    }
}

/// Per-instance kernel configuration fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelOptions {
    /// Rewind oscillator phase whenever `prepare` runs.
    pub reset_phase_on_prepare: bool,
    /// LFO sharing across channels.
    pub lfo_routing: LfoRouting,
    /// Amplitude modulation mapping.
    pub polarity: ModulationPolarity,
    /// Fractional-delay interpolation for modulated delay lines.
    pub interpolation: Interpolation,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            reset_phase_on_prepare: true,
            lfo_routing: LfoRouting::PerChannel,
            polarity: ModulationPolarity::Bipolar,
            interpolation: Interpolation::Thiran,
        }
    }
}

/// Object-safe processing interface shared by every effect.
pub trait EffectKernel: Send {
    /// Re-sizes buffers for a new spec and clears signal state.
    ///
    /// Oscillator phase is rewound only when the kernel was created with
    /// [`KernelOptions::reset_phase_on_prepare`].
    fn prepare(&mut self, spec: &ProcessSpec, params: &ParameterStore);

    /// Processes one block in place. Each inner slice is one channel.
    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore);

    /// Clears signal state (delay contents, filter memories) without
    /// touching allocation or phase policy.
    fn reset(&mut self);

    /// Frees what `prepare` allocated. The kernel passes audio through
    /// unchanged until prepared again.
    fn release(&mut self) {}

    /// Processing latency in samples.
    fn latency_samples(&self) -> usize {
        0
    }

    /// How long output continues after input stops, in seconds.
    fn tail_seconds(&self, _params: &ParameterStore) -> f32 {
        0.0
    }
}

/// Construction side of a kernel: its parameter table and a prepared
/// constructor.
pub trait KernelFactory: EffectKernel + Sized {
    /// Parameters in declaration order (the persisted state order).
    const PARAMS: &'static [ParamDescriptor];

    /// Builds a kernel already prepared for `spec`.
    fn create(spec: &ProcessSpec, options: &KernelOptions, params: &ParameterStore) -> Self;
}
