//! Phase-accumulating low-frequency oscillator.
//!
//! The oscillator keeps its phase in radians, wrapped to `[0, 2π)`, and
//! shapes it through an arbitrary waveform function. Output is taken
//! *before* the phase advances, so a freshly reset oscillator starts at
//! `f(0)`.
//!
//! Changing the frequency never touches the phase: an LFO whose rate is
//! automated mid-stream stays continuous. Only [`Oscillator::reset`] rewinds
//! it.
//!
//! # Example
//!
//! ```rust
//! use vibra_core::Oscillator;
//!
//! let mut lfo = Oscillator::new(44100.0, 5.0);
//! let first = lfo.next_sample();
//! assert_eq!(first, 0.0); // sin(0)
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use crate::kernel::LfoRouting;
use alloc::vec::Vec;
use core::f32::consts::{PI, TAU};
use core::f64::consts::TAU as TAU_F64;
use libm::{fabsf, floor, floorf, sinf};

/// Waveform shaping function mapping phase (radians) to `[-1, 1]`.
pub type Waveform = fn(f32) -> f32;

/// Sine waveform.
#[inline]
pub fn sine(phase: f32) -> f32 {
    sinf(phase)
}

/// Triangle waveform, in phase with [`sine`] (0 at phase 0, peak at π/2).
#[inline]
pub fn triangle(phase: f32) -> f32 {
    let t = phase / TAU + 0.25;
    let t = t - floorf(t);
    1.0 - 4.0 * fabsf(t - 0.5)
}

/// Rising sawtooth, −1 at phase 0.
#[inline]
pub fn saw(phase: f32) -> f32 {
    phase / PI - 1.0
}

/// Square wave, +1 for the first half cycle.
#[inline]
pub fn square(phase: f32) -> f32 {
    if phase < PI { 1.0 } else { -1.0 }
}

/// Low-frequency oscillator with a pluggable waveform.
///
/// Phase is accumulated in `f64`: at LFO rates the per-sample increment is a
/// few hundred ulps of an `f32` phase, and the rounding bias would drift the
/// period audibly over long runs.
#[derive(Debug, Clone, Copy)]
pub struct Oscillator {
    /// Current phase in radians, `[0, 2π)`.
    phase: f64,
    /// Frequency in Hz.
    frequency: f32,
    sample_rate: f32,
    /// Phase increment per sample in radians.
    increment: f64,
    waveform: Waveform,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}

impl Oscillator {
    /// Creates a sine oscillator at phase 0.
    pub fn new(sample_rate: f32, frequency: f32) -> Self {
        Self::with_waveform(sample_rate, frequency, sine)
    }

    /// Creates an oscillator with the given waveform at phase 0.
    pub fn with_waveform(sample_rate: f32, frequency: f32, waveform: Waveform) -> Self {
        let mut osc = Self {
            phase: 0.0,
            frequency: 0.0,
            sample_rate,
            increment: 0.0,
            waveform,
        };
        osc.set_frequency(frequency);
        osc
    }

    /// Sets frequency in Hz. Negative values are treated as 0. Phase is kept.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.max(0.0);
        self.update_increment();
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Updates the sample rate, keeping frequency and phase.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_increment();
    }

    /// Rewinds the phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f32 {
        // Narrowing can round up to exactly TAU.
        let p = self.phase as f32;
        if p >= TAU { 0.0 } else { p }
    }

    /// Sets the phase in radians, wrapping into `[0, 2π)`.
    ///
    /// Used to offset the per-channel oscillators of a stereo effect.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_phase(f64::from(phase));
    }

    /// Returns `f(phase)` and advances by one sample period.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = (self.waveform)(self.phase as f32);
        self.phase = wrap_phase(self.phase + self.increment);
        out
    }

    fn update_increment(&mut self) {
        self.increment = if self.sample_rate > 0.0 {
            TAU_F64 * f64::from(self.frequency) / f64::from(self.sample_rate)
        } else {
            0.0
        };
    }
}

/// One oscillator per channel, all at the same rate.
///
/// With [`LfoRouting::PerChannel`] channel `k` of `n` starts at phase
/// `2π·k/n`, so a stereo pair runs in antiphase and wider layouts are spread
/// evenly around the cycle. With [`LfoRouting::Shared`] every channel starts
/// at 0 and the oscillators run in lockstep. The offsets hold for the life
/// of the bank; only the shared rate changes.
#[derive(Debug, Clone, Default)]
pub struct OscillatorBank {
    oscillators: Vec<Oscillator>,
    routing: LfoRouting,
}

impl OscillatorBank {
    /// Creates an empty per-channel bank. Call [`prepare`](Self::prepare)
    /// before use.
    pub const fn new() -> Self {
        Self::with_routing(LfoRouting::PerChannel)
    }

    /// Creates an empty bank with the given routing.
    pub const fn with_routing(routing: LfoRouting) -> Self {
        Self {
            oscillators: Vec::new(),
            routing,
        }
    }

    /// Sizes the bank for `channels` and sets rate and sample rate.
    ///
    /// Existing oscillators keep their phase unless `reset_phase` is set, in
    /// which case every channel returns to its start phase. Added channels
    /// always begin at their start phase.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32, frequency: f32, reset_phase: bool) {
        let existing = self.oscillators.len().min(channels);
        let routing = self.routing;
        self.oscillators
            .resize_with(channels, || Oscillator::new(sample_rate, frequency));
        for (k, osc) in self.oscillators.iter_mut().enumerate() {
            osc.set_sample_rate(sample_rate);
            osc.set_frequency(frequency);
            if reset_phase || k >= existing {
                osc.set_phase(start_phase(routing, k, channels));
            }
        }
    }

    /// Sets every oscillator's frequency. Phases are kept.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        for osc in &mut self.oscillators {
            osc.set_frequency(frequency);
        }
    }

    /// Number of oscillators.
    pub fn len(&self) -> usize {
        self.oscillators.len()
    }

    /// Returns `true` when the bank is unprepared or released.
    pub fn is_empty(&self) -> bool {
        self.oscillators.is_empty()
    }

    /// Oscillators, one per channel.
    pub fn oscillators(&self) -> &[Oscillator] {
        &self.oscillators
    }

    /// Mutable oscillators, one per channel.
    pub fn oscillators_mut(&mut self) -> &mut [Oscillator] {
        &mut self.oscillators
    }

    /// Returns every channel to its start phase.
    pub fn reset(&mut self) {
        let channels = self.oscillators.len();
        let routing = self.routing;
        for (k, osc) in self.oscillators.iter_mut().enumerate() {
            osc.set_phase(start_phase(routing, k, channels));
        }
    }

    /// Drops all oscillators.
    pub fn release(&mut self) {
        self.oscillators = Vec::new();
    }
}

/// Start phase of channel `k` in a bank of `channels`.
#[inline]
fn start_phase(routing: LfoRouting, k: usize, channels: usize) -> f32 {
    match routing {
        LfoRouting::PerChannel if channels > 0 => TAU * k as f32 / channels as f32,
        _ => 0.0,
    }
}

/// Wraps any finite phase into `[0, 2π)`; non-finite phases become 0.
#[inline]
fn wrap_phase(phase: f64) -> f64 {
    if (0.0..TAU_F64).contains(&phase) {
        return phase;
    }
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase - TAU_F64 * floor(phase / TAU_F64);
    if wrapped >= TAU_F64 { 0.0 } else { wrapped }
}
