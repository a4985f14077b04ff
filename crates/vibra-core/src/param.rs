//! Parameter descriptors: the static half of every effect parameter.
//!
//! A [`ParamDescriptor`] carries everything a host or editor needs to present
//! a control: its stable name, range, default, unit and capability flags.
//! Effects declare their parameters as a `const` slice of descriptors; the
//! order of that slice is the declaration order used by
//! [`StateCodec`](crate::StateCodec) and by index-based access on
//! [`ParameterStore`](crate::ParameterStore).
//!
//! # Example
//!
//! ```rust
//! use vibra_core::{ParamDescriptor, ParamUnit};
//!
//! const PARAMS: &[ParamDescriptor] = &[
//!     ParamDescriptor::new("rate", "Rate", ParamUnit::Hertz, 0.0, 20.0, 5.0),
//!     ParamDescriptor::unit_interval("depth", "Depth", 0.5),
//! ];
//!
//! assert_eq!(PARAMS[0].clamp(40.0), 20.0);
//! assert_eq!(PARAMS[1].normalize(0.5), 0.5);
//! ```

/// Parameter capability flags for host communication.
///
/// Use [`union`](Self::union) to combine.
///
/// ```rust
/// use vibra_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!flags.contains(ParamFlags::HIDDEN));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter (default for all params).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter takes integer steps (mode selectors, bit depth).
    pub const STEPPED: Self = Self(1 << 1);
    /// Parameter should be hidden from generic host UI.
    pub const HIDDEN: Self = Self(1 << 2);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamUnit {
    /// Dimensionless value (gain factors, coefficients, mix amounts).
    #[default]
    None,
    /// Frequency in Hz.
    Hertz,
    /// Time in seconds.
    Seconds,
    /// Time in milliseconds.
    Milliseconds,
    /// Level in decibels.
    Decibels,
    /// Compression ratio (`n:1`).
    Ratio,
    /// Bit depth.
    Bits,
}

impl ParamUnit {
    /// Display suffix appended after the formatted value.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::None => "",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Seconds => " s",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Decibels => " dB",
            ParamUnit::Ratio => ":1",
            ParamUnit::Bits => " bit",
        }
    }
}

/// Describes a single parameter's identity, range and default.
///
/// `name` is the stable identity: it is what `get`/`set` by name resolve
/// against and what configuration files use. `short_name` is a display label.
///
/// Descriptors are `Copy` and constructible in `const` context so that each
/// effect can publish a `&'static [ParamDescriptor]` table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Stable identifier (e.g. `"feedback"`).
    pub name: &'static str,

    /// Human-readable label (e.g. `"Feedback"`).
    pub short_name: &'static str,

    /// Unit type for formatting the value.
    pub unit: ParamUnit,

    /// Minimum allowed value.
    pub min: f32,

    /// Maximum allowed value.
    pub max: f32,

    /// Value the parameter holds after construction or reset.
    pub default: f32,

    /// Recommended increment for encoder-style control.
    pub step: f32,

    /// Capability flags.
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Creates a continuous, automatable parameter.
    pub const fn new(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            step: 0.01,
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// A dimensionless `[0, 1]` control (depth, mix, feedback amount).
    pub const fn unit_interval(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self::new(name, short_name, ParamUnit::None, 0.0, 1.0, default)
    }

    /// An integer-valued selector spanning `min..=max`.
    pub const fn stepped(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::new(name, short_name, unit, min, max, default)
            .with_step(1.0)
            .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED))
    }

    /// Sets the encoder step.
    pub const fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Replaces the capability flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Clamps a value to the valid range.
    ///
    /// NaN maps to the default so a garbled input can never reach the audio
    /// thread. Stepped parameters are rounded to the nearest integer.
    ///
    /// ```rust
    /// use vibra_core::ParamDescriptor;
    ///
    /// let mix = ParamDescriptor::unit_interval("mix", "Mix", 0.5);
    /// assert_eq!(mix.clamp(-1.0), 0.0);
    /// assert_eq!(mix.clamp(2.0), 1.0);
    /// assert_eq!(mix.clamp(f32::NAN), 0.5);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let value = if self.flags.contains(ParamFlags::STEPPED) {
            libm::roundf(value)
        } else {
            value
        };
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Converts a plain value to `[0, 1]`.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / range
    }

    /// Converts a normalized value back to the plain range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.clamp(self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min))
    }

    /// Returns `true` if the value lies within `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: ParamDescriptor =
        ParamDescriptor::new("rate", "Rate", ParamUnit::Hertz, 0.0, 20.0, 5.0);
    const MODE: ParamDescriptor =
        ParamDescriptor::stepped("mode", "Mode", ParamUnit::None, 0.0, 9.0, 0.0);

    #[test]
    fn test_clamp_range() {
        assert_eq!(RATE.clamp(-3.0), 0.0);
        assert_eq!(RATE.clamp(25.0), 20.0);
        assert_eq!(RATE.clamp(7.5), 7.5);
    }

    #[test]
    fn test_clamp_nan_uses_default() {
        assert_eq!(RATE.clamp(f32::NAN), 5.0);
    }

    #[test]
    fn test_clamp_infinity() {
        assert_eq!(RATE.clamp(f32::INFINITY), 20.0);
        assert_eq!(RATE.clamp(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_stepped_rounds() {
        assert_eq!(MODE.clamp(2.4), 2.0);
        assert_eq!(MODE.clamp(2.6), 3.0);
        assert!(MODE.flags.contains(ParamFlags::STEPPED));
        assert_eq!(MODE.step, 1.0);
    }

    #[test]
    fn test_normalize_denormalize() {
        assert_eq!(RATE.normalize(10.0), 0.5);
        assert_eq!(RATE.denormalize(0.25), 5.0);
        assert_eq!(RATE.normalize(100.0), 1.0);
    }

    #[test]
    fn test_zero_width_range() {
        let fixed = ParamDescriptor::new("x", "X", ParamUnit::None, 1.0, 1.0, 1.0);
        assert_eq!(fixed.normalize(1.0), 0.0);
        assert_eq!(fixed.clamp(3.0), 1.0);
    }

    #[test]
    fn test_unit_suffix() {
        assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
        assert_eq!(ParamUnit::Ratio.suffix(), ":1");
        assert_eq!(ParamUnit::None.suffix(), "");
    }

    #[test]
    fn test_default_flags() {
        assert_eq!(ParamFlags::default(), ParamFlags::AUTOMATABLE);
        assert!(RATE.flags.contains(ParamFlags::AUTOMATABLE));
        assert!(!RATE.flags.contains(ParamFlags::STEPPED));
    }
}
