//! Peak envelope follower with separate attack and release ballistics.
//!
//! Used by the compressor engine's level detector.

use libm::expf;

/// One-pole peak detector.
///
/// `coeff = exp(−1 / (time_ms · sample_rate / 1000))`; the attack
/// coefficient applies while the rectified input is above the envelope, the
/// release coefficient otherwise. A time of zero makes that side
/// instantaneous.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Creates a follower with 10 ms attack and 100 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, 10.0, 100.0)
    }

    /// Creates a follower with explicit times.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms: attack_ms.max(0.0),
            release_ms: release_ms.max(0.0),
        };
        follower.recalculate();
        follower
    }

    /// Sets attack time. Only recomputes when the value changes.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        let attack_ms = attack_ms.max(0.0);
        if attack_ms != self.attack_ms {
            self.attack_ms = attack_ms;
            self.recalculate();
        }
    }

    /// Sets release time. Only recomputes when the value changes.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        let release_ms = release_ms.max(0.0);
        if release_ms != self.release_ms {
            self.release_ms = release_ms;
            self.recalculate();
        }
    }

    /// Updates sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Attack time in ms.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Release time in ms.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Feeds one sample and returns the updated envelope.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level = input.abs();
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = crate::math::flush_denormal(coeff * self.envelope + (1.0 - coeff) * level);
        self.envelope
    }

    /// Current envelope.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Zeroes the envelope.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate(&mut self) {
        self.attack_coeff = time_coefficient(self.attack_ms, self.sample_rate);
        self.release_coeff = time_coefficient(self.release_ms, self.sample_rate);
    }
}

#[inline]
fn time_coefficient(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = time_ms * sample_rate / 1000.0;
    if samples > 0.0 { expf(-1.0 / samples) } else { 0.0 }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(48000.0)
    }
}
