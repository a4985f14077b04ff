//! Stateless per-sample waveshaping transfer functions.
//!
//! A [`Waveshaper`] pairs one [`DistortionMode`] with the coefficients that
//! mode reads. It is rebuilt once per block from the current parameter values
//! and then applied sample by sample; dispatch goes through a table of plain
//! functions indexed by mode, so there is a single processing loop for every
//! mode.
//!
//! | Index | Mode | Transfer |
//! |-------|------|----------|
//! | 0 | `Bypass` | `x` |
//! | 1 | `ArctanSoftClip` | `(2/π)·atan(k·x)` |
//! | 2 | `CubicSoftClip` | `x − a·x³` inside the monotonic region, flat outside |
//! | 3 | `TriangleFold` | `abs(fmod(2x + 2, 4)) − 1` |
//! | 4 | `ThresholdGap` | dead zone between `low` and `high` |
//! | 5 | `BitCrush` | `ceil(x·2^(b−1)) / 2^(b−1)` |
//! | 6 | `Dropout` | 0 with probability `p`, else `x` |
//! | 7 | `Wavefold` | reflect at `±t` |
//! | 8 | `HardClip` | clamp to `±t` |
//! | 9 | `SaturatedFuzz` | `(1−m)·tanh(s·x) + m·clamp(x, ±t)` |
//! | 10 | `Unspecified` | `x` (reserved, not designed) |
//!
//! # Thresholds
//!
//! User-facing knobs are intensities: every internal threshold is
//! `BASE / knob`, so turning a knob up lowers the threshold. Knob ranges
//! exclude zero.
//!
//! ```rust
//! use vibra_core::{DistortionMode, Lcg, ShaperSettings, Waveshaper};
//!
//! let settings = ShaperSettings { clip: 5.0, ..ShaperSettings::default() };
//! let shaper = Waveshaper::from_config(DistortionMode::HardClip, &settings);
//! let mut rng = Lcg::default();
//!
//! // 0.05 / 5 = 0.01
//! assert_eq!(shaper.shape(1.0, &mut rng), 0.01);
//! ```

use core::f32::consts::FRAC_2_PI;
use libm::{atanf, ceilf, copysignf, fabsf, fmodf, powf, sqrtf, tanhf};

/// Base constant for the hard-clip and fuzz thresholds.
pub const CLIP_BASE: f32 = 0.05;
/// Base constant for the wavefold threshold.
pub const FOLD_BASE: f32 = 1.0;
/// Base constant for the threshold-gap boundaries.
pub const GAP_BASE: f32 = 1.0;

/// Distortion algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum DistortionMode {
    /// No shaping.
    #[default]
    Bypass,
    /// Arctangent soft clip with drive `k`.
    ArctanSoftClip,
    /// Cubic soft clip `x − a·x³`.
    CubicSoftClip,
    /// Triangle fold.
    TriangleFold,
    /// Dead zone between two thresholds.
    ThresholdGap,
    /// Amplitude quantization.
    BitCrush,
    /// Random sample dropout.
    Dropout,
    /// Mirror fold at a threshold.
    Wavefold,
    /// Hard clip at `0.05 / clip`.
    HardClip,
    /// Blend of tanh saturation and hard clip.
    SaturatedFuzz,
    /// Reserved slot: the originating design for this mode was never
    /// finished. Behaves as [`Bypass`](Self::Bypass).
    Unspecified,
}

impl DistortionMode {
    /// Every mode in index order.
    pub const ALL: [Self; 11] = [
        Self::Bypass,
        Self::ArctanSoftClip,
        Self::CubicSoftClip,
        Self::TriangleFold,
        Self::ThresholdGap,
        Self::BitCrush,
        Self::Dropout,
        Self::Wavefold,
        Self::HardClip,
        Self::SaturatedFuzz,
        Self::Unspecified,
    ];

    /// Number of modes.
    pub const COUNT: usize = Self::ALL.len();

    /// Mode for a parameter index. Unknown indices are [`Bypass`](Self::Bypass).
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Mode for a (stepped) parameter value. Negative or NaN values are
    /// [`Bypass`](Self::Bypass).
    pub fn from_param(value: f32) -> Self {
        if value >= 0.0 {
            Self::from_index(libm::roundf(value) as usize)
        } else {
            Self::Bypass
        }
    }

    /// Parameter index of this mode.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bypass => "Bypass",
            Self::ArctanSoftClip => "Arctan Soft Clip",
            Self::CubicSoftClip => "Cubic Soft Clip",
            Self::TriangleFold => "Triangle Fold",
            Self::ThresholdGap => "Threshold Gap",
            Self::BitCrush => "Bit Crush",
            Self::Dropout => "Dropout",
            Self::Wavefold => "Wavefold",
            Self::HardClip => "Hard Clip",
            Self::SaturatedFuzz => "Saturated Fuzz",
            Self::Unspecified => "Unspecified",
        }
    }
}

/// User-facing knob values consumed by the waveshapers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaperSettings {
    /// Arctan drive `k`.
    pub drive: f32,
    /// Cubic coefficient `a`.
    pub cubic: f32,
    /// Fuzz saturation intensity.
    pub saturation: f32,
    /// Fuzz blend between saturation (0) and clip (1).
    pub mix: f32,
    /// Clip intensity; threshold is `CLIP_BASE / clip`.
    pub clip: f32,
    /// Fold intensity; threshold is `FOLD_BASE / fold`.
    pub fold: f32,
    /// Gap lower intensity; boundary is `GAP_BASE / gap_low`.
    pub gap_low: f32,
    /// Gap upper intensity; boundary is `GAP_BASE / gap_high`.
    pub gap_high: f32,
    /// Bit depth.
    pub bits: f32,
    /// Dropout probability per sample.
    pub drop: f32,
}

impl Default for ShaperSettings {
    fn default() -> Self {
        Self {
            drive: 1.0,
            cubic: 1.0 / 3.0,
            saturation: 1.0,
            mix: 0.5,
            clip: 5.0,
            fold: 1.0,
            gap_low: 8.0,
            gap_high: 4.0,
            bits: 8.0,
            drop: 0.1,
        }
    }
}

/// Internal coefficients derived from [`ShaperSettings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaperCoefficients {
    /// Arctan drive.
    pub drive: f32,
    /// Cubic coefficient.
    pub cubic: f32,
    /// Fuzz saturation.
    pub saturation: f32,
    /// Fuzz blend.
    pub blend: f32,
    /// Hard clip / fuzz threshold.
    pub clip_threshold: f32,
    /// Wavefold threshold.
    pub fold_threshold: f32,
    /// Lower gap boundary.
    pub gap_low: f32,
    /// Upper gap boundary.
    pub gap_high: f32,
    /// Quantization levels `2^(bits−1)`.
    pub levels: f32,
    /// Dropout probability.
    pub drop: f32,
}

impl ShaperCoefficients {
    /// Derives internal thresholds from knob values.
    pub fn from_settings(s: &ShaperSettings) -> Self {
        let low = inverse(GAP_BASE, s.gap_low);
        let high = inverse(GAP_BASE, s.gap_high);
        Self {
            drive: s.drive,
            cubic: s.cubic,
            saturation: s.saturation,
            blend: s.mix.clamp(0.0, 1.0),
            clip_threshold: inverse(CLIP_BASE, s.clip),
            fold_threshold: inverse(FOLD_BASE, s.fold),
            gap_low: low.min(high),
            gap_high: low.max(high),
            levels: powf(2.0, libm::roundf(s.bits).max(1.0) - 1.0),
            drop: s.drop.clamp(0.0, 1.0),
        }
    }
}

/// `base / knob`, with a zero knob meaning "threshold at infinity".
#[inline]
fn inverse(base: f32, knob: f32) -> f32 {
    if knob > 0.0 { base / knob } else { f32::INFINITY }
}

/// Uniform noise for the dropout mode.
///
/// Numerical Recipes LCG; the upper 16 bits form the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Seed used by [`Default`] and after [`reset`](Self::reset).
    pub const DEFAULT_SEED: u32 = 0x1234_5678;

    /// Creates a generator with the given seed.
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Restores the default seed.
    pub fn reset(&mut self) {
        self.state = Self::DEFAULT_SEED;
    }

    /// Next value in `[0, 1)`.
    #[inline]
    pub fn next_unit(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let upper = (self.state >> 16) as u16;
        f32::from(upper) / 65_536.0
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

/// Arctangent soft clip. Output magnitude is below 1 for any input.
#[inline]
pub fn arctan_soft_clip(x: f32, drive: f32) -> f32 {
    FRAC_2_PI * atanf(drive * x)
}

/// Cubic soft clip `x − a·x³`.
///
/// Beyond the turning point `x₀ = 1/√(3a)` the output holds at `±(2/3)·x₀`.
/// A non-positive coefficient is the identity.
#[inline]
pub fn cubic_soft_clip(x: f32, a: f32) -> f32 {
    if a <= 0.0 {
        return x;
    }
    let knee = 1.0 / sqrtf(3.0 * a);
    if fabsf(x) >= knee {
        copysignf(2.0 / 3.0 * knee, x)
    } else {
        x - a * x * x * x
    }
}

/// Triangle fold `abs(fmod(2x + 2, 4)) − 1`, with C-style truncated `fmod`.
#[inline]
pub fn triangle_fold(x: f32) -> f32 {
    fabsf(fmodf(2.0 * x + 2.0, 4.0)) - 1.0
}

/// Dead-zone shaper.
///
/// Above `high` the signal is shifted towards zero by `high − low`; inside
/// `[low, high]` it snaps to the nearer boundary; below `low` it passes.
/// Symmetric in sign.
#[inline]
pub fn threshold_gap(x: f32, low: f32, high: f32) -> f32 {
    let mag = fabsf(x);
    let out = if mag > high {
        mag - (high - low)
    } else if mag >= low {
        if mag - low <= high - mag { low } else { high }
    } else {
        mag
    };
    copysignf(out, x)
}

/// Quantize to `levels` steps per unit, rounding up.
#[inline]
pub fn bit_crush(x: f32, levels: f32) -> f32 {
    ceilf(x * levels) / levels
}

/// Zero the sample when `noise < probability`, else pass it.
#[inline]
pub fn dropout(x: f32, probability: f32, noise: f32) -> f32 {
    if noise < probability { 0.0 } else { x }
}

/// Mirror fold at `±threshold`.
///
/// Any amount past the threshold is reflected back, repeatedly, so the
/// output always lies within `±threshold`. A non-finite threshold is the
/// identity.
#[inline]
pub fn wavefold(x: f32, threshold: f32) -> f32 {
    if !threshold.is_finite() || fabsf(x) <= threshold {
        return x;
    }
    if threshold <= 0.0 {
        return 0.0;
    }
    let period = 4.0 * threshold;
    let mut u = fmodf(x + threshold, period);
    if u < 0.0 {
        u += period;
    }
    let folded = if u < 2.0 * threshold {
        u - threshold
    } else {
        3.0 * threshold - u
    };
    folded.clamp(-threshold, threshold)
}

/// Hard clip to `±threshold`.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    x.clamp(-threshold, threshold)
}

/// `(1 − blend)·tanh(saturation·x) + blend·clamp(x, ±threshold)`.
#[inline]
pub fn saturated_fuzz(x: f32, saturation: f32, blend: f32, threshold: f32) -> f32 {
    (1.0 - blend) * tanhf(saturation * x) + blend * hard_clip(x, threshold)
}

type ShapeFn = fn(f32, &ShaperCoefficients, &mut Lcg) -> f32;

const SHAPERS: [ShapeFn; DistortionMode::COUNT] = [
    |x, _, _| x,
    |x, c, _| arctan_soft_clip(x, c.drive),
    |x, c, _| cubic_soft_clip(x, c.cubic),
    |x, _, _| triangle_fold(x),
    |x, c, _| threshold_gap(x, c.gap_low, c.gap_high),
    |x, c, _| bit_crush(x, c.levels),
    |x, c, rng| dropout(x, c.drop, rng.next_unit()),
    |x, c, _| wavefold(x, c.fold_threshold),
    |x, c, _| hard_clip(x, c.clip_threshold),
    |x, c, _| saturated_fuzz(x, c.saturation, c.blend, c.clip_threshold),
    |x, _, _| x,
];

/// One distortion mode with its coefficients, ready to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waveshaper {
    mode: DistortionMode,
    coefficients: ShaperCoefficients,
}

impl Waveshaper {
    /// Builds a shaper from a mode and knob values.
    pub fn from_config(mode: DistortionMode, settings: &ShaperSettings) -> Self {
        Self {
            mode,
            coefficients: ShaperCoefficients::from_settings(settings),
        }
    }

    /// Active mode.
    pub fn mode(&self) -> DistortionMode {
        self.mode
    }

    /// Derived coefficients.
    pub fn coefficients(&self) -> &ShaperCoefficients {
        &self.coefficients
    }

    /// Applies the transfer function to one sample.
    ///
    /// `rng` is only advanced by [`DistortionMode::Dropout`].
    #[inline]
    pub fn shape(&self, x: f32, rng: &mut Lcg) -> f32 {
        SHAPERS[self.mode.index()](x, &self.coefficients, rng)
    }

    /// Applies the transfer function in place to a block.
    #[inline]
    pub fn shape_block(&self, block: &mut [f32], rng: &mut Lcg) {
        let f = SHAPERS[self.mode.index()];
        for sample in block.iter_mut() {
            *sample = f(*sample, &self.coefficients, rng);
        }
    }
}

impl Default for Waveshaper {
    fn default() -> Self {
        Self::from_config(DistortionMode::Bypass, &ShaperSettings::default())
    }
}
