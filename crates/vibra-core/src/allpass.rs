//! First-order all-pass section for phase-shifting effects.

use core::f32::consts::PI;
use libm::tanf;

/// Lowest cutoff accepted by [`FirstOrderAllpass::set_frequency`].
pub const MIN_FREQUENCY: f32 = 10.0;

/// First-order all-pass filter.
///
/// `y[n] = a·x[n] + x[n−1] − a·y[n−1]` with
/// `a = (tan(π·fc/fs) − 1) / (tan(π·fc/fs) + 1)`.
///
/// Unity magnitude at every frequency; the phase passes through −90° at `fc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOrderAllpass {
    a: f32,
    x1: f32,
    y1: f32,
}

impl FirstOrderAllpass {
    /// Creates a section with `a = 0` (a pure one-sample delay).
    pub const fn new() -> Self {
        Self {
            a: 0.0,
            x1: 0.0,
            y1: 0.0,
        }
    }

    /// Sets the −90° frequency, clamped to `[10 Hz, 0.4·fs]`.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32, sample_rate: f32) {
        let frequency = frequency.clamp(MIN_FREQUENCY, sample_rate * 0.4);
        let t = tanf(PI * frequency / sample_rate);
        self.a = (t - 1.0) / (t + 1.0);
    }

    /// Current coefficient.
    pub fn coefficient(&self) -> f32 {
        self.a
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.a * input + self.x1 - self.a * self.y1;
        self.x1 = input;
        self.y1 = crate::math::flush_denormal(output);
        output
    }

    /// Clears the filter memories.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
