//! Multi-channel circular delay line with fractional reads and feedback.
//!
//! One [`DelayLine`] holds an independent ring buffer per channel, all of the
//! same capacity. Buffers are sized in [`DelayLine::prepare`] and never
//! reallocated while processing.
//!
//! # Addressing
//!
//! After `push(ch, x)`, `pop(ch, 0.0)` returns `x`; `pop(ch, d)` returns the
//! sample pushed `d` pushes earlier. Fractional `d` is resolved by the line's
//! [`Interpolation`] mode.
//!
//! | Mode | Taps | State | Group delay |
//! |------|------|-------|-------------|
//! | `None` | 1 | no | exact (truncated) |
//! | `Linear` | 2 | no | exact |
//! | `Thiran` | 2 | one term per read tap | ~1 sample extra at small fractions |
//!
//! A ring may be read by several taps per sample (a multi-voice chorus).
//! [`DelayLine::prepare_taps`] gives each tap its own Thiran state so the
//! voices share one ring without their interpolators interfering.
//!
//! # Sizing
//!
//! Modulated effects multiply their base delay by `(1 + lfo)`, so
//! [`capacity_for`] reserves twice the nominal maximum plus a small margin.
//! Reads beyond capacity are a sizing fault; the read offset is saturated to
//! the last valid tap rather than checked.
//!
//! # Example
//!
//! ```rust
//! use vibra_core::{DelayLine, Interpolation};
//!
//! let mut line = DelayLine::new(Interpolation::Linear);
//! line.prepare(1, 64);
//!
//! line.push(0, 1.0);
//! for _ in 0..9 {
//!     line.push(0, 0.0);
//! }
//! assert_eq!(line.pop(0, 9.0, false), 1.0);
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use libm::ceilf;

/// Extra slots beyond the worst-case modulated delay.
pub const SAFETY_MARGIN: usize = 4;

/// Capacity in samples for a line whose nominal maximum delay is
/// `max_seconds` at `sample_rate`: twice the nominal maximum plus
/// [`SAFETY_MARGIN`].
pub fn capacity_for(sample_rate: f32, max_seconds: f32) -> usize {
    let nominal = ceilf((sample_rate * max_seconds).max(0.0)) as usize;
    2 * nominal + SAFETY_MARGIN
}

/// Interpolation method for fractional delay reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Truncate to the newer integer tap.
    None,
    /// Linear interpolation between the two nearest taps.
    #[default]
    Linear,
    /// First-order all-pass (Thiran) interpolation.
    ///
    /// Flat magnitude response, at the cost of a per-channel state term and
    /// up to one sample of extra group delay.
    Thiran,
}

/// Fractions below this are shifted up by one sample for Thiran reads, which
/// keeps the all-pass coefficient away from 1.
const THIRAN_SHIFT_THRESHOLD: f32 = 0.618;

/// Circular sample buffer, one ring per channel.
#[derive(Debug, Clone, Default)]
pub struct DelayLine {
    /// Channel-major storage: `capacity` samples per channel.
    buffer: Vec<f32>,
    /// Next slot to be written, per channel.
    write_index: Vec<usize>,
    /// Previous Thiran output, `taps` entries per channel.
    thiran_state: Vec<f32>,
    capacity: usize,
    taps: usize,
    interpolation: Interpolation,
}

impl DelayLine {
    /// Creates an unsized line. Call [`prepare`](Self::prepare) before use.
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            ..Self::default()
        }
    }

    /// (Re)sizes the line for `channels` rings of `capacity` samples each and
    /// clears all state. Each ring has a single read tap.
    ///
    /// This and [`prepare_taps`](Self::prepare_taps) are the only methods
    /// that allocate. Capacity is at least 2.
    pub fn prepare(&mut self, channels: usize, capacity: usize) {
        self.prepare_taps(channels, capacity, 1);
    }

    /// Like [`prepare`](Self::prepare), with `taps` independent read taps per
    /// ring for [`pop_tap`](Self::pop_tap).
    pub fn prepare_taps(&mut self, channels: usize, capacity: usize, taps: usize) {
        let capacity = capacity.max(2);
        let taps = taps.max(1);
        self.capacity = capacity;
        self.taps = taps;
        self.buffer.clear();
        self.buffer.resize(channels * capacity, 0.0);
        self.write_index.clear();
        self.write_index.resize(channels, 0);
        self.thiran_state.clear();
        self.thiran_state.resize(channels * taps, 0.0);
        #[cfg(feature = "tracing")]
        tracing::debug!(channels, capacity, taps, "delay line prepared");
    }

    /// Capacity in samples per channel.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of channel rings.
    pub fn channels(&self) -> usize {
        self.write_index.len()
    }

    /// Read taps per ring.
    pub fn taps(&self) -> usize {
        self.taps
    }

    /// Current interpolation mode.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Zeroes all samples and interpolator state, keeping capacity.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_index.fill(0);
        self.thiran_state.fill(0.0);
    }

    /// Frees all storage. The line reports zero channels until prepared
    /// again.
    pub fn release(&mut self) {
        *self = Self::new(self.interpolation);
    }

    /// Writes one sample and advances the channel's write index.
    #[inline]
    pub fn push(&mut self, channel: usize, sample: f32) {
        let cap = self.capacity;
        let w = self.write_index[channel];
        self.buffer[channel * cap + w] = sample;
        self.write_index[channel] = if w + 1 == cap { 0 } else { w + 1 };
    }

    /// Reads the sample pushed `delay` pushes ago through the ring's first
    /// tap.
    ///
    /// With `interpolate = false` the fractional part is dropped. With
    /// `interpolate = true` the line's [`Interpolation`] mode is used.
    #[inline]
    pub fn pop(&mut self, channel: usize, delay: f32, interpolate: bool) -> f32 {
        self.pop_tap(channel, 0, delay, interpolate)
    }

    /// Reads through read tap `tap` of the channel's ring. Taps differ only
    /// in their interpolator state.
    #[inline]
    pub fn pop_tap(&mut self, channel: usize, tap: usize, delay: f32, interpolate: bool) -> f32 {
        let max = (self.capacity - 1) as f32;
        let delay = if delay > 0.0 { delay.min(max) } else { 0.0 };
        let mut delay_int = delay as usize;
        let mut frac = delay - delay_int as f32;

        let mode = if interpolate {
            self.interpolation
        } else {
            Interpolation::None
        };

        match mode {
            Interpolation::None => self.tap(channel, delay_int),
            Interpolation::Linear => {
                let newer = self.tap(channel, delay_int);
                if frac == 0.0 {
                    return newer;
                }
                let older = self.tap(channel, delay_int + 1);
                newer + frac * (older - newer)
            }
            Interpolation::Thiran => {
                if frac < THIRAN_SHIFT_THRESHOLD && delay_int >= 1 {
                    frac += 1.0;
                    delay_int -= 1;
                }
                let alpha = (1.0 - frac) / (1.0 + frac);
                let state = channel * self.taps + tap;
                let newer = self.tap(channel, delay_int);
                let out = if frac == 0.0 {
                    newer
                } else {
                    let older = self.tap(channel, delay_int + 1);
                    older + alpha * (newer - self.thiran_state[state])
                };
                self.thiran_state[state] = out;
                out
            }
        }
    }

    /// Feedback comb step.
    ///
    /// Reads the slot written `delay` samples ago, scales it by `feedback`
    /// to form the wet sample, writes `input + wet` into the current slot and
    /// advances. Returns the wet sample. `delay` is saturated to
    /// `[1, capacity]`.
    #[inline]
    pub fn feedback(&mut self, channel: usize, input: f32, delay: usize, feedback: f32) -> f32 {
        let cap = self.capacity;
        let delay = delay.clamp(1, cap);
        let w = self.write_index[channel];
        let mut r = w + cap - delay;
        if r >= cap {
            r -= cap;
        }
        let base = channel * cap;
        let wet = self.buffer[base + r] * feedback;
        self.buffer[base + w] = crate::math::flush_denormal(input + wet);
        self.write_index[channel] = if w + 1 == cap { 0 } else { w + 1 };
        wet
    }

    /// Integer tap: 0 is the most recent push.
    #[inline]
    fn tap(&self, channel: usize, delay: usize) -> f32 {
        let cap = self.capacity;
        // delay <= cap - 1 here, so one subtraction suffices.
        let mut idx = self.write_index[channel] + cap - 1 - delay.min(cap - 1);
        if idx >= cap {
            idx -= cap;
        }
        self.buffer[channel * cap + idx]
    }
}
